use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::LayerSpec;
use crate::protocol::code::ErrorCode;
use crate::weights::WeightTensor;

/// Commands from the session to the training worker.
///
/// On the wire every message is a JSON object tagged by `"code"`, e.g.
/// `{"code":"ValuesUpdate","learningRate":0.1,"trainingSpeed":100}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum OutboundMessage {
    LayersSet {
        layers: LayerSpec,
    },
    ValuesUpdate {
        #[serde(rename = "learningRate")]
        learning_rate: f64,
        #[serde(rename = "trainingSpeed")]
        training_speed: u32,
    },
    TrainingUpload {
        file: Value,
    },
    InputUpload {
        file: Value,
    },
    StartTraining,
    StopTraining,
    RunPrediction,
}

/// Replies and progress reports from the training worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum InboundMessage {
    ModuleReady,
    StartSuccess,
    StoppedTraining {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weights: Option<WeightTensor>,
    },
    TrainingUpdate {
        epochs: u64,
        error: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weights: Option<WeightTensor>,
    },
    InputUploadSuccess,
    #[serde(rename = "JSONSuccess")]
    JsonSuccess,
    PredictionSuccess {
        outputs: Vec<Vec<f64>>,
    },
    #[serde(rename = "InvalidInputJSONFormat")]
    InvalidInputJsonFormat,
    InputFileEntrySizeError,
    InputFileFormatError,
    InputFileNumberError,
    #[serde(rename = "JSONFormatError")]
    JsonFormatError,
    /// Any code this build does not know.
    #[serde(other)]
    Unrecognized,
}

impl InboundMessage {
    /// Builds the inbound message for an error code.
    pub fn failure(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidInputJsonFormat => InboundMessage::InvalidInputJsonFormat,
            ErrorCode::InputFileEntrySizeError => InboundMessage::InputFileEntrySizeError,
            ErrorCode::InputFileFormatError => InboundMessage::InputFileFormatError,
            ErrorCode::InputFileNumberError => InboundMessage::InputFileNumberError,
            ErrorCode::JsonFormatError => InboundMessage::JsonFormatError,
            ErrorCode::Protocol => InboundMessage::Unrecognized,
        }
    }

    /// The notice this message raises, if it is an error report.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            InboundMessage::InvalidInputJsonFormat => Some(ErrorCode::InvalidInputJsonFormat),
            InboundMessage::InputFileEntrySizeError => Some(ErrorCode::InputFileEntrySizeError),
            InboundMessage::InputFileFormatError => Some(ErrorCode::InputFileFormatError),
            InboundMessage::InputFileNumberError => Some(ErrorCode::InputFileNumberError),
            InboundMessage::JsonFormatError => Some(ErrorCode::JsonFormatError),
            InboundMessage::Unrecognized => Some(ErrorCode::Protocol),
            _ => None,
        }
    }

    /// Short name for log lines; never includes the weight payload.
    pub fn name(&self) -> &'static str {
        match self {
            InboundMessage::ModuleReady => "ModuleReady",
            InboundMessage::StartSuccess => "StartSuccess",
            InboundMessage::StoppedTraining { .. } => "StoppedTraining",
            InboundMessage::TrainingUpdate { .. } => "TrainingUpdate",
            InboundMessage::InputUploadSuccess => "InputUploadSuccess",
            InboundMessage::JsonSuccess => "JSONSuccess",
            InboundMessage::PredictionSuccess { .. } => "PredictionSuccess",
            InboundMessage::InvalidInputJsonFormat => "InvalidInputJSONFormat",
            InboundMessage::InputFileEntrySizeError => "InputFileEntrySizeError",
            InboundMessage::InputFileFormatError => "InputFileFormatError",
            InboundMessage::InputFileNumberError => "InputFileNumberError",
            InboundMessage::JsonFormatError => "JSONFormatError",
            InboundMessage::Unrecognized => "Unrecognized",
        }
    }
}

impl OutboundMessage {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundMessage::LayersSet { .. } => "LayersSet",
            OutboundMessage::ValuesUpdate { .. } => "ValuesUpdate",
            OutboundMessage::TrainingUpload { .. } => "TrainingUpload",
            OutboundMessage::InputUpload { .. } => "InputUpload",
            OutboundMessage::StartTraining => "StartTraining",
            OutboundMessage::StopTraining => "StopTraining",
            OutboundMessage::RunPrediction => "RunPrediction",
        }
    }
}
