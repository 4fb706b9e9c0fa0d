pub mod gradient;

pub use gradient::{Gradient, Rgb, WEIGHT_SCALE};
