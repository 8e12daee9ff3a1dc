use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::logfile::LogMode;
use crate::notifier::DEFAULT_TIMEOUT;
use crate::style::ColorMode;

/// Everything a [`Printer`](crate::Printer) is constructed from.
///
/// Every field has a default, so a config can be deserialized from a partial
/// table in an application's own configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Display name shown before every info message.
    pub name: String,
    /// Starting indent level.
    pub indent: usize,
    pub prefix_color: Color,
    pub message_color: Color,
    pub color: ColorMode,
    pub log_path: Option<PathBuf>,
    pub log_mode: LogMode,
    /// Whether popup requests are honored at all.
    pub notifications: bool,
    pub sound: Option<String>,
    pub notify_timeout_ms: u64,
    /// Port of an AnyBar widget to signal on warnings and errors.
    pub anybar_port: Option<u16>,
    /// Drop info and debug messages.
    pub quiet: bool,
    /// Show debug messages.
    pub debug: bool,
}

impl Default for PrinterConfig {
    fn default() -> PrinterConfig {
        PrinterConfig {
            name: String::new(),
            indent: 0,
            prefix_color: Color::PREFIX,
            message_color: Color::MESSAGE,
            color: ColorMode::Auto,
            log_path: None,
            log_mode: LogMode::Append,
            notifications: true,
            sound: None,
            notify_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            anybar_port: None,
            quiet: false,
            debug: false,
        }
    }
}

impl PrinterConfig {
    pub fn new(name: impl Into<String>) -> PrinterConfig {
        PrinterConfig {
            name: name.into(),
            ..PrinterConfig::default()
        }
    }

    pub fn indent(mut self, indent: usize) -> PrinterConfig {
        self.indent = indent;
        self
    }

    pub fn prefix_color(mut self, color: Color) -> PrinterConfig {
        self.prefix_color = color;
        self
    }

    pub fn message_color(mut self, color: Color) -> PrinterConfig {
        self.message_color = color;
        self
    }

    pub fn color(mut self, mode: ColorMode) -> PrinterConfig {
        self.color = mode;
        self
    }

    pub fn log_path(mut self, path: impl AsRef<Path>) -> PrinterConfig {
        self.log_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn log_mode(mut self, mode: LogMode) -> PrinterConfig {
        self.log_mode = mode;
        self
    }

    pub fn notifications(mut self, enabled: bool) -> PrinterConfig {
        self.notifications = enabled;
        self
    }

    pub fn sound(mut self, sound: impl Into<String>) -> PrinterConfig {
        self.sound = Some(sound.into());
        self
    }

    pub fn notify_timeout(mut self, timeout: Duration) -> PrinterConfig {
        self.notify_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn anybar_port(mut self, port: u16) -> PrinterConfig {
        self.anybar_port = Some(port);
        self
    }

    pub fn quiet(mut self, quiet: bool) -> PrinterConfig {
        self.quiet = quiet;
        self
    }

    pub fn debug(mut self, debug: bool) -> PrinterConfig {
        self.debug = debug;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = PrinterConfig::default();
        assert_eq!("", config.name);
        assert_eq!(Color::Cyan, config.prefix_color);
        assert_eq!(Color::Default, config.message_color);
        assert!(config.notifications);
        assert_eq!(Duration::from_secs(5), config.timeout());
    }

    #[test]
    fn builder() {
        let config = PrinterConfig::new("app")
            .indent(2)
            .log_path("/tmp/app.log")
            .anybar_port(1740)
            .notify_timeout(Duration::from_millis(250))
            .debug(true);

        assert_eq!("app", config.name);
        assert_eq!(2, config.indent);
        assert_eq!(Some(PathBuf::from("/tmp/app.log")), config.log_path);
        assert_eq!(Some(1740), config.anybar_port);
        assert_eq!(Duration::from_millis(250), config.timeout());
        assert!(config.debug);
    }

    #[test]
    fn deserialize_partial() {
        let config: PrinterConfig = serde_json::from_str(
            r#"{
                "name": "sim",
                "prefix_color": "lightgreen",
                "color": "never",
                "log_mode": "truncate",
                "quiet": true
            }"#,
        )
        .unwrap();

        assert_eq!("sim", config.name);
        assert_eq!(Color::Seafoam, config.prefix_color);
        assert_eq!(ColorMode::Never, config.color);
        assert_eq!(LogMode::Truncate, config.log_mode);
        assert!(config.quiet);
        assert_eq!(None, config.log_path);
    }

    #[test]
    fn deserialize_rejects_unknown_color() {
        let result = serde_json::from_str::<PrinterConfig>(r#"{ "message_color": "mauve" }"#);
        assert!(result.is_err());
    }
}
