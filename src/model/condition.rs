//! Fault / health state of a condition data item

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Condition level, ordered by severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionLevel {
    Normal,
    Warning,
    Fault,
    #[default]
    Unavailable,
}

impl ConditionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionLevel::Normal => "NORMAL",
            ConditionLevel::Warning => "WARNING",
            ConditionLevel::Fault => "FAULT",
            ConditionLevel::Unavailable => "UNAVAILABLE",
        }
    }
}

impl fmt::Display for ConditionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(ConditionLevel::Normal),
            "WARNING" => Ok(ConditionLevel::Warning),
            "FAULT" => Ok(ConditionLevel::Fault),
            "UNAVAILABLE" => Ok(ConditionLevel::Unavailable),
            other => Err(ModelError::Decode(format!("Unknown condition level {:?}", other))),
        }
    }
}

/// Which side of the normal range a condition is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionQualifier {
    High,
    Low,
}

impl ConditionQualifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionQualifier::High => "HIGH",
            ConditionQualifier::Low => "LOW",
        }
    }
}

impl FromStr for ConditionQualifier {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(ConditionQualifier::High),
            "LOW" => Ok(ConditionQualifier::Low),
            other => Err(ModelError::Decode(format!("Unknown qualifier {:?}", other))),
        }
    }
}

/// Last known condition of a data item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionState {
    pub level: ConditionLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<ConditionQualifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ConditionState {
    pub fn new(level: ConditionLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn normal() -> Self {
        Self::new(ConditionLevel::Normal)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(ConditionLevel::Warning).with_text(text)
    }

    pub fn fault(text: impl Into<String>) -> Self {
        Self::new(ConditionLevel::Fault).with_text(text)
    }

    pub fn unavailable() -> Self {
        Self::new(ConditionLevel::Unavailable)
    }

    pub fn with_native_code(mut self, code: impl Into<String>) -> Self {
        self.native_code = Some(code.into());
        self
    }

    pub fn with_native_severity(mut self, severity: impl Into<String>) -> Self {
        self.native_severity = Some(severity.into());
        self
    }

    pub fn with_qualifier(mut self, qualifier: ConditionQualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered_by_severity() {
        assert!(ConditionLevel::Normal < ConditionLevel::Warning);
        assert!(ConditionLevel::Warning < ConditionLevel::Fault);
        assert!(ConditionLevel::Fault < ConditionLevel::Unavailable);
    }

    #[test]
    fn test_level_text_round_trips() {
        for level in [
            ConditionLevel::Normal,
            ConditionLevel::Warning,
            ConditionLevel::Fault,
            ConditionLevel::Unavailable,
        ] {
            assert_eq!(level.as_str().parse::<ConditionLevel>().unwrap(), level);
        }
        assert!("fault".parse::<ConditionLevel>().is_err());
        assert_eq!("LOW".parse::<ConditionQualifier>().unwrap(), ConditionQualifier::Low);
    }

    #[test]
    fn test_builder() {
        let state = ConditionState::fault("Overtemp")
            .with_native_code("E42")
            .with_qualifier(ConditionQualifier::High);
        assert_eq!(state.level, ConditionLevel::Fault);
        assert_eq!(state.native_code.as_deref(), Some("E42"));
        assert_eq!(state.text.as_deref(), Some("Overtemp"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let json = serde_json::to_string(&ConditionState::normal()).unwrap();
        assert_eq!(json, r#"{"level":"NORMAL"}"#);
    }
}
