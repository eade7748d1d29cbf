//! Descriptive metadata attached to components

use serde::{Deserialize, Serialize};
use std::fmt;

/// Manufacturer-facing description of a component
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Description {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Free-form text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Description {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Kind of software/hardware metadata a component can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SoftwareKind {
    Application,
    Firmware,
    Hardware,
    Library,
}

impl SoftwareKind {
    pub const ALL: [SoftwareKind; 4] = [
        SoftwareKind::Application,
        SoftwareKind::Firmware,
        SoftwareKind::Hardware,
        SoftwareKind::Library,
    ];

    /// Data item type
    pub fn type_id(&self) -> &'static str {
        match self {
            SoftwareKind::Application => "APPLICATION",
            SoftwareKind::Firmware => "FIRMWARE",
            SoftwareKind::Hardware => "HARDWARE",
            SoftwareKind::Library => "LIBRARY",
        }
    }

    /// Name segment used in derived data item ids
    pub fn name_id(&self) -> &'static str {
        match self {
            SoftwareKind::Application => "application",
            SoftwareKind::Firmware => "firmware",
            SoftwareKind::Hardware => "hardware",
            SoftwareKind::Library => "library",
        }
    }
}

impl fmt::Display for SoftwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_id())
    }
}

pub const SUBTYPE_INSTALL_DATE: &str = "INSTALL_DATE";
pub const SUBTYPE_LICENSE: &str = "LICENSE";
pub const SUBTYPE_MANUFACTURER: &str = "MANUFACTURER";
pub const SUBTYPE_RELEASE_DATE: &str = "RELEASE_DATE";
pub const SUBTYPE_VERSION: &str = "VERSION";

/// Version and provenance of a piece of software or hardware
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftwareInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl SoftwareInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..Default::default()
        }
    }

    /// Fields paired with their data item subtype
    pub fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            (SUBTYPE_INSTALL_DATE, self.install_date.as_deref()),
            (SUBTYPE_LICENSE, self.license.as_deref()),
            (SUBTYPE_MANUFACTURER, self.manufacturer.as_deref()),
            (SUBTYPE_RELEASE_DATE, self.release_date.as_deref()),
            (SUBTYPE_VERSION, self.version.as_deref()),
        ]
    }

    pub(crate) fn set_field(&mut self, subtype: &str, value: String) {
        match subtype {
            SUBTYPE_INSTALL_DATE => self.install_date = Some(value),
            SUBTYPE_LICENSE => self.license = Some(value),
            SUBTYPE_MANUFACTURER => self.manufacturer = Some(value),
            SUBTYPE_RELEASE_DATE => self.release_date = Some(value),
            SUBTYPE_VERSION => self.version = Some(value),
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
