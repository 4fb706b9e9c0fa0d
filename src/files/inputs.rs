use serde_json::Value;

use crate::error::FileError;
use crate::files::training::JSON_MIME;
use crate::protocol::ErrorCode;

/// `{ "inputs": [[...], ...] }` rows to run through the trained network.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub inputs: Vec<Vec<f64>>,
}

/// Upload-side check for prediction inputs.
///
/// A wrong mime type is an `InputFileFormatError`; anything that is not an
/// object with a non-empty `inputs` array is `InvalidInputJSONFormat`.
pub fn check_input_upload(mime: Option<&str>, body: &[u8]) -> Result<Value, FileError> {
    if mime != Some(JSON_MIME) {
        return Err(FileError::NotJson {
            mime: mime.map(str::to_owned),
            code: ErrorCode::InputFileFormatError,
        });
    }
    let code = ErrorCode::InvalidInputJsonFormat;
    let doc: Value =
        serde_json::from_slice(body).map_err(|source| FileError::Parse { source, code })?;
    match doc.get("inputs").and_then(Value::as_array) {
        Some(rows) if !rows.is_empty() => Ok(doc),
        _ => Err(FileError::MissingKey { key: "inputs", code }),
    }
}

impl InputFile {
    /// Worker-side decode. Rows must be arrays of numbers, each exactly
    /// `width` long.
    pub fn from_value(doc: &Value, width: usize) -> Result<InputFile, ErrorCode> {
        let rows = doc
            .get("inputs")
            .and_then(Value::as_array)
            .filter(|rows| !rows.is_empty())
            .ok_or(ErrorCode::InvalidInputJsonFormat)?;

        let mut inputs = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = row.as_array().ok_or(ErrorCode::InvalidInputJsonFormat)?;
            let values = cells
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .ok_or(ErrorCode::InputFileNumberError)?;
            if values.len() != width {
                return Err(ErrorCode::InputFileEntrySizeError);
            }
            inputs.push(values);
        }
        Ok(InputFile { inputs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upload_codes() {
        let err = check_input_upload(Some("image/png"), b"").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InputFileFormatError);

        let err = check_input_upload(Some(JSON_MIME), b"{\"inputs\": []}").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInputJsonFormat);

        let err = check_input_upload(Some(JSON_MIME), b"{").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInputJsonFormat);

        assert!(check_input_upload(Some(JSON_MIME), b"{\"inputs\": [[1, 2]]}").is_ok());
    }

    #[test]
    fn worker_decode_codes() {
        let ok = json!({"inputs": [[1.0, 0.5], [0, 2]]});
        assert_eq!(
            InputFile::from_value(&ok, 2).unwrap().inputs,
            vec![vec![1.0, 0.5], vec![0.0, 2.0]]
        );
        assert_eq!(
            InputFile::from_value(&json!({"inputs": [[1, "x"]]}), 2),
            Err(ErrorCode::InputFileNumberError)
        );
        assert_eq!(
            InputFile::from_value(&json!({"inputs": [[1, 2, 3]]}), 2),
            Err(ErrorCode::InputFileEntrySizeError)
        );
        assert_eq!(
            InputFile::from_value(&json!({"rows": [[1, 2]]}), 2),
            Err(ErrorCode::InvalidInputJsonFormat)
        );
    }
}
