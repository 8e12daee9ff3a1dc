//! Colorful console output.
//!
//! A [`Printer`] decorates messages with a severity glyph, its name and the
//! current indentation, colors them for the terminal and can mirror them to
//! a log file, a desktop notification and an AnyBar menubar widget.
//!
//! ```no_run
//! use pouty::{args, Printer, PrinterConfig};
//!
//! let printer = Printer::configure(PrinterConfig::new("app").log_path("app.log"))?;
//! printer.info("Loaded {0} items", &args![42])?;
//! printer.error("Missing key: {key}", &args![; key = "token"])?;
//! # Ok::<(), pouty::Error>(())
//! ```

#[macro_use]
mod macros;

pub mod color;
pub mod config;
pub mod console;
pub mod error;
pub mod logfile;
pub mod notifier;
pub mod printer;
pub mod severity;
pub mod style;
pub mod template;
pub mod utils;

pub use anybar;

pub use crate::color::Color;
pub use crate::config::PrinterConfig;
pub use crate::console::{Capture, Console};
pub use crate::error::{ConfigurationError, Error, FormatError, IndentError, NotifyError, Result};
pub use crate::logfile::{LogFile, LogMode};
pub use crate::notifier::{Backend, Notification, Notifier};
pub use crate::printer::{PrintOptions, Printer, Section};
pub use crate::severity::Severity;
pub use crate::style::ColorMode;
pub use crate::template::{Arg, Args, Template};
