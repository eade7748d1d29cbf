//! TOML documents

use super::{DocumentEntity, Formatter};
use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormatter;

impl TomlFormatter {
    pub const ID: &'static str = "toml";
    pub const CONTENT_TYPE: &'static str = "application/toml";

    pub fn new() -> Self {
        Self
    }
}

impl Formatter for TomlFormatter {
    fn id(&self) -> &str {
        Self::ID
    }

    fn content_type(&self) -> &str {
        Self::CONTENT_TYPE
    }

    fn encode(&self, entity: &DocumentEntity) -> Result<Vec<u8>> {
        toml::to_string_pretty(entity)
            .map(String::into_bytes)
            .map_err(|e| ModelError::Encode(format!("Failed to encode {} as TOML: {}", entity.kind(), e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<DocumentEntity> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ModelError::Decode(format!("TOML document is not UTF-8: {}", e)))?;
        toml::from_str(text).map_err(|e| ModelError::Decode(format!("Invalid TOML document: {}", e)))
    }
}
