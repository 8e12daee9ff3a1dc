use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// A template and its arguments do not fit together.
///
/// These are programmer errors: they are always returned to the caller and
/// never written to any sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("single '{brace}' encountered at offset {offset} in template")]
    UnmatchedBrace { brace: char, offset: usize },

    #[error("replacement index {0} out of range for positional arguments")]
    MissingPositional(usize),

    #[error("no keyword argument named {0:?}")]
    MissingNamed(String),

    #[error("cannot switch between automatic and manual field numbering")]
    MixedNumbering,

    #[error("invalid replacement field {0:?}")]
    InvalidField(String),

    #[error("invalid format spec {spec:?} for {field:?}")]
    InvalidSpec { field: String, spec: String },

    #[error("{0} positional argument(s) not used by template")]
    UnusedPositional(usize),

    #[error("keyword argument {0:?} not used by template")]
    UnusedNamed(String),
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("log file {} is not writable: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown color {0:?}")]
    UnknownColor(String),

    #[error("unknown severity {0:?}")]
    UnknownSeverity(String),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum IndentError {
    #[error("cannot dedent below zero")]
    Underflow,
}

/// Failure of a desktop notification attempt. Never surfaced from
/// [`Printer`](crate::Printer) calls.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no notification backend available")]
    Unavailable,

    #[error("could not run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exited with {status}", .program.display())]
    Status { program: PathBuf, status: ExitStatus },

    #[error("{} did not finish within {timeout:?}", .program.display())]
    Timeout { program: PathBuf, timeout: Duration },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Indent(#[from] IndentError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
