use serde::Serialize;

use crate::protocol::ErrorCode;

/// A one-shot message for the user, shown as a modal by the presentation
/// surface and cleared once taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub code: ErrorCode,
    pub text: String,
}

impl Notice {
    pub fn new(code: ErrorCode) -> Self {
        Notice {
            code,
            text: code.description().to_owned(),
        }
    }

    pub fn with_text(code: ErrorCode, text: impl Into<String>) -> Self {
        Notice {
            code,
            text: text.into(),
        }
    }
}
