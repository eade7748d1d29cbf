//! Error handling for the equipment model
//!
//! This module defines the crate error type and a Result alias used by the
//! registries, the ingestion path and the document formatters. Hot-path
//! reads on the live model never produce errors; absence is `None`.

use thiserror::Error;

/// Main error type for model operations
#[derive(Error, Debug)]
pub enum ModelError {
    /// No formatter is registered under the requested id
    #[error("Formatter Not Found for \"{id}\"")]
    FormatterNotFound { id: String },

    /// A second formatter tried to register an id that is already taken
    #[error("Formatter \"{id}\" is already registered")]
    DuplicateFormatter { id: String },

    /// A second kind tried to register a type id that is already taken
    #[error("Kind \"{type_id}\" is already registered")]
    DuplicateKind { type_id: String },

    /// The unit table has no entry for the requested pair
    #[error("Unsupported unit conversion from {native_units} to {units}")]
    UnsupportedConversion { units: String, native_units: String },

    /// Strict ingestion received a value for an id the node never declared
    #[error("Data item \"{data_item_id}\" is not declared on component \"{component_id}\"")]
    UndeclaredDataItem {
        component_id: String,
        data_item_id: String,
    },

    /// Errors raised while encoding a document
    #[error("Encode error: {0}")]
    Encode(String),

    /// Errors raised while decoding a document
    #[error("Decode error: {0}")]
    Decode(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to Rhai script compilation or execution
    #[error("Script error: {0}")]
    Script(String),

    /// Errors raised by a history sink
    #[error("Sink error: {0}")]
    Sink(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ModelError>,
    },
}

impl ModelError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ModelError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any context wrappers
    pub fn root(&self) -> &ModelError {
        match self {
            ModelError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
