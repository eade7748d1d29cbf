//! JSON documents

use super::{DocumentEntity, Formatter};
use crate::error::{ModelError, Result};

/// Pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub const ID: &'static str = "json";
    pub const CONTENT_TYPE: &'static str = "application/json";

    pub fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn id(&self) -> &str {
        Self::ID
    }

    fn content_type(&self) -> &str {
        Self::CONTENT_TYPE
    }

    fn encode(&self, entity: &DocumentEntity) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(entity)
            .map_err(|e| ModelError::Encode(format!("Failed to encode {} as JSON: {}", entity.kind(), e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<DocumentEntity> {
        serde_json::from_slice(bytes)
            .map_err(|e| ModelError::Decode(format!("Invalid JSON document: {}", e)))
    }
}
