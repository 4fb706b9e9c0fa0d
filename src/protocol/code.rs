use std::fmt;

use serde::{Deserialize, Serialize};

/// Codes of the user-visible notices.
///
/// The first five travel on the wire unchanged; `Protocol` covers anything
/// the worker sends that the session does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "InvalidInputJSONFormat")]
    InvalidInputJsonFormat,
    InputFileEntrySizeError,
    InputFileFormatError,
    InputFileNumberError,
    #[serde(rename = "JSONFormatError")]
    JsonFormatError,
    Protocol,
}

impl ErrorCode {
    /// Whether this code also withdraws the current prediction inputs.
    pub fn invalidates_inputs(self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidInputJsonFormat
                | ErrorCode::InputFileEntrySizeError
                | ErrorCode::InputFileFormatError
                | ErrorCode::InputFileNumberError
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::InvalidInputJsonFormat => {
                "The input file must be a JSON object with a non-empty \"inputs\" array."
            }
            ErrorCode::InputFileEntrySizeError => {
                "Every input row must have as many values as the network has inputs."
            }
            ErrorCode::InputFileFormatError => "The input file must be a JSON file.",
            ErrorCode::InputFileNumberError => "Every input value must be a number.",
            ErrorCode::JsonFormatError => {
                "The training file must be a JSON object with a non-empty \"data\" array \
                 of {input, output} pairs matching the network's shape."
            }
            ErrorCode::Protocol => "The training worker sent a message that could not be understood.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::InvalidInputJsonFormat => "InvalidInputJSONFormat",
            ErrorCode::InputFileEntrySizeError => "InputFileEntrySizeError",
            ErrorCode::InputFileFormatError => "InputFileFormatError",
            ErrorCode::InputFileNumberError => "InputFileNumberError",
            ErrorCode::JsonFormatError => "JSONFormatError",
            ErrorCode::Protocol => "Protocol",
        };
        f.write_str(name)
    }
}
