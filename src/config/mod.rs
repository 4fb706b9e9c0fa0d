pub mod hyperparams;

pub use hyperparams::{
    parse_learning_rate, parse_training_speed, Hyperparams, LEARNING_RATE_LIMITS,
    TRAINING_SPEED_LIMITS,
};
