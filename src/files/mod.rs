pub mod export;
pub mod inputs;
pub mod training;

pub use export::{PredictionExport, WeightsExport, OUTPUTS_FILE_NAME, WEIGHTS_FILE_NAME};
pub use inputs::{check_input_upload, InputFile};
pub use training::{check_training_upload, Sample, TrainingFile, JSON_MIME};
