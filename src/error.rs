use thiserror::Error;

use crate::protocol::ErrorCode;

/// Reasons the layout engine refuses a `LayerSpec`.
///
/// A refused spec never replaces the current layout; callers keep whatever
/// they displayed before.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("a network needs at least 2 layers, got {found}")]
    TooFewLayers { found: usize },
    #[error("layer {layer} has zero width")]
    ZeroWidthLayer { layer: usize },
    #[error("a network may have at most {max} layers, got {found}")]
    TooManyLayers { found: usize, max: usize },
    #[error("layer {layer} has {width} units, at most {max} are drawn")]
    LayerTooWide { layer: usize, width: usize, max: usize },
}

/// A weight tensor that cannot be drawn against the current node-index matrix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("weight tensor has {found} layer transitions, current topology has {expected}")]
    TransitionCount { expected: usize, found: usize },
    #[error("transition {transition}: {found} destination units, expected {expected}")]
    DestinationCount {
        transition: usize,
        expected: usize,
        found: usize,
    },
    #[error("transition {transition}, unit {unit}: {found} source weights, expected {expected}")]
    SourceCount {
        transition: usize,
        unit: usize,
        expected: usize,
        found: usize,
    },
    #[error("non-finite weight at transition {transition}, unit {unit}, input {input}")]
    NonFinite {
        transition: usize,
        unit: usize,
        input: usize,
    },
}

/// Rejected user configuration. The prior value stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("learning rate {value:?} is not a number within [0.01, 0.5]")]
    LearningRate { value: String },
    #[error("training speed {value:?} is not an integer within [1, 100000]")]
    TrainingSpeed { value: String },
    #[error("layer list {value:?} must be comma-separated non-negative integers")]
    Layers { value: String },
}

/// An uploaded file that failed the structural checks.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("expected an application/json upload, got {mime:?}")]
    NotJson { mime: Option<String>, code: ErrorCode },
    #[error("file is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        code: ErrorCode,
    },
    #[error("file has no non-empty {key:?} array")]
    MissingKey { key: &'static str, code: ErrorCode },
}

impl FileError {
    /// The notice code shown to the user for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            FileError::NotJson { code, .. }
            | FileError::Parse { code, .. }
            | FileError::MissingKey { code, .. } => *code,
        }
    }
}

/// Requests the session refuses in its current state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the network cannot be reconfigured while training is running")]
    TrainingActive,
    #[error("the training worker is not ready")]
    WorkerUnavailable,
    #[error("no training run is in progress")]
    NotTraining,
    #[error("no prediction inputs have been accepted yet")]
    NotPredictable,
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    File(#[from] FileError),
}
