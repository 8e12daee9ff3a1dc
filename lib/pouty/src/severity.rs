use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{de::Deserializer, Deserialize};

use crate::color::Color;
use crate::error::ConfigurationError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Which standard stream a severity is written to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Default for Severity {
    fn default() -> Severity {
        Severity::Info
    }
}

impl Display for Severity {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{:?}", self)
    }
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
    ];

    pub fn glyph(self) -> char {
        match self {
            Severity::Debug => '·',
            Severity::Info => '●',
            Severity::Warning => '!',
            Severity::Error => '✘',
        }
    }

    /// Label shown in the console prefix. Info messages show only the
    /// printer name.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Severity::Debug => Some("Debug"),
            Severity::Info => None,
            Severity::Warning => Some("Warning"),
            Severity::Error => Some("Error"),
        }
    }

    /// Tag used in log file lines.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    pub fn stream(self) -> Stream {
        match self {
            Severity::Warning | Severity::Error => Stream::Stderr,
            Severity::Debug | Severity::Info => Stream::Stdout,
        }
    }

    /// Prefix and message colors, or `None` when the printer's own colors
    /// apply.
    pub fn colors(self) -> Option<(Color, Color)> {
        match self {
            Severity::Error => Some((Color::Red, Color::Red)),
            Severity::Warning => Some((Color::Orange, Color::Orange)),
            Severity::Debug => Some((Color::DimGray, Color::Smoke)),
            Severity::Info => None,
        }
    }

    /// Messages that are shown even in quiet mode.
    pub fn is_urgent(self) -> bool {
        self >= Severity::Warning
    }

    pub fn try_parse_str(severity: &str) -> Result<Severity, ConfigurationError> {
        match severity.trim().to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(ConfigurationError::UnknownSeverity(severity.to_string())),
        }
    }
}

impl FromStr for Severity {
    type Err = ConfigurationError;

    fn from_str(severity: &str) -> Result<Severity, ConfigurationError> {
        Severity::try_parse_str(severity)
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Severity, D::Error>
    where
        D: Deserializer<'de>,
    {
        let severity = String::deserialize(deserializer)?;
        Severity::try_parse_str(&severity).map_err(serde::de::Error::custom)
    }
}
