use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FileError;
use crate::graph::LayerSpec;
use crate::protocol::ErrorCode;

pub const JSON_MIME: &str = "application/json";

/// One `{input, output}` pair. Outputs are expected pre-scaled to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Vec<f64>,
    pub output: Vec<f64>,
}

/// `{ "data": [ {input, output}, ... ] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingFile {
    pub data: Vec<Sample>,
}

/// Upload-side check: JSON mime type, valid JSON, non-empty `data` array.
///
/// Returns the parsed document so it can be forwarded to the worker as-is;
/// numeric contents are left to the worker.
pub fn check_training_upload(mime: Option<&str>, body: &[u8]) -> Result<Value, FileError> {
    let code = ErrorCode::JsonFormatError;
    if mime != Some(JSON_MIME) {
        return Err(FileError::NotJson {
            mime: mime.map(str::to_owned),
            code,
        });
    }
    let doc: Value =
        serde_json::from_slice(body).map_err(|source| FileError::Parse { source, code })?;
    match doc.get("data").and_then(Value::as_array) {
        Some(rows) if !rows.is_empty() => Ok(doc),
        _ => Err(FileError::MissingKey { key: "data", code }),
    }
}

impl TrainingFile {
    /// Worker-side decode: every sample must match the network's widths.
    pub fn from_value(doc: Value, layers: &LayerSpec) -> Result<TrainingFile, ErrorCode> {
        let file: TrainingFile =
            serde_json::from_value(doc).map_err(|_| ErrorCode::JsonFormatError)?;
        if file.data.is_empty() {
            return Err(ErrorCode::JsonFormatError);
        }
        if !file.fits(layers) {
            return Err(ErrorCode::JsonFormatError);
        }
        Ok(file)
    }

    pub fn fits(&self, layers: &LayerSpec) -> bool {
        let (Some(inputs), Some(outputs)) = (layers.inputs(), layers.outputs()) else {
            return false;
        };
        self.data
            .iter()
            .all(|s| s.input.len() == inputs && s.output.len() == outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upload_requires_json_mime() {
        let err = check_training_upload(Some("text/csv"), b"{}").unwrap_err();
        assert_eq!(err.code(), ErrorCode::JsonFormatError);
        assert!(check_training_upload(None, b"{}").is_err());
    }

    #[test]
    fn upload_requires_non_empty_data() {
        for body in [&b"{}"[..], &b"{\"data\": []}"[..], &b"{\"data\": 3}"[..], &b"not json"[..]] {
            let err = check_training_upload(Some(JSON_MIME), body).unwrap_err();
            assert_eq!(err.code(), ErrorCode::JsonFormatError);
        }
        let doc = check_training_upload(Some(JSON_MIME), br#"{"data":[{"input":[1],"output":[0]}]}"#)
            .unwrap();
        assert_eq!(doc["data"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn worker_decode_checks_widths() {
        let layers = LayerSpec::new(vec![2, 3, 1]);
        let good = json!({"data": [{"input": [0.1, 0.2], "output": [1.0]}]});
        assert_eq!(TrainingFile::from_value(good, &layers).unwrap().data.len(), 1);

        let wide = json!({"data": [{"input": [0.1, 0.2, 0.3], "output": [1.0]}]});
        assert_eq!(TrainingFile::from_value(wide, &layers), Err(ErrorCode::JsonFormatError));

        let text = json!({"data": [{"input": ["a", 0.2], "output": [1.0]}]});
        assert_eq!(TrainingFile::from_value(text, &layers), Err(ErrorCode::JsonFormatError));
    }
}
