use serde::Serialize;

use crate::weights::WeightTensor;

pub const WEIGHTS_FILE_NAME: &str = "weights.json";
pub const OUTPUTS_FILE_NAME: &str = "outputs.json";

/// `{ "weights": [...] }`, written once when a run stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightsExport {
    pub weights: WeightTensor,
}

/// Raw prediction outputs, one row per input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionExport {
    pub outputs: Vec<Vec<f64>>,
}

impl WeightsExport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        to_pretty_json(self)
    }
}

impl PredictionExport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        to_pretty_json(self)
    }
}

/// Pretty JSON with four-space indentation.
fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
