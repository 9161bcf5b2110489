use crate::error::PolicyError;
use crate::model::Document;
use serde::Serialize;
use serde_json::Value;

/// Convert an attestation record into the document the engine evaluates.
///
/// The record is encoded to JSON text and decoded back into a generic value. Numbers are
/// decoded as exact literals (`arbitrary_precision`), never through `f64`.
pub fn normalize<T: Serialize + ?Sized>(record: &T) -> Result<Document, PolicyError> {
    let encoded = serde_json::to_vec(record).map_err(PolicyError::Serialization)?;
    let value: Value = serde_json::from_slice(&encoded).map_err(PolicyError::InputDecode)?;
    Ok(Document::from(value))
}
