use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::severity::Severity;
use crate::utils::strip_ansi;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    Append,
    Truncate,
}

impl Default for LogMode {
    fn default() -> LogMode {
        LogMode::Append
    }
}

/// Append-only plain text log, one line per message.
///
/// Writes hold the file lock for exactly one line. There is no rotation and
/// no coordination with other processes writing the same path.
pub struct LogFile {
    path: PathBuf,
    writer: Mutex<Writer>,
}

struct Writer {
    file: File,
    // raw output left the last line without a newline
    line_open: bool,
}

impl LogFile {
    pub fn open(path: impl AsRef<Path>, mode: LogMode) -> Result<LogFile, ConfigurationError> {
        let path = path.as_ref().to_path_buf();

        let mut options = OpenOptions::new();
        match mode {
            LogMode::Append => options.create(true).append(true),
            LogMode::Truncate => options.create(true).write(true).truncate(true),
        };

        let file = options
            .open(&path)
            .map_err(|source| ConfigurationError::LogFile {
                path: path.clone(),
                source,
            })?;

        Ok(LogFile {
            path,
            writer: Mutex::new(Writer {
                file,
                line_open: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one message line, first terminating any line left open by
    /// [`append_raw`](LogFile::append_raw).
    pub fn append(&self, severity: Severity, prefix: &str, message: &str) -> io::Result<()> {
        let line = format_line(Local::now(), severity, prefix, message);
        let mut writer = self.lock();
        if writer.line_open {
            writer.write(b"\n")?;
        }
        writer.write(line.as_bytes())
    }

    /// Mirror raw console output, minus escape codes.
    pub fn append_raw(&self, text: &str) -> io::Result<()> {
        let text = strip_ansi(text);
        if text.is_empty() {
            return Ok(());
        }
        self.lock().write(text.as_bytes())
    }

    pub fn is_line_open(&self) -> bool {
        self.lock().line_open
    }

    fn lock(&self) -> MutexGuard<'_, Writer> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Writer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        if let Some(&last) = bytes.last() {
            self.line_open = last != b'\n';
        }
        Ok(())
    }
}

/// `<timestamp> [<LEVEL>] <prefix> <message>`, newline terminated. Line
/// breaks inside the message are escaped so each message stays on one line.
pub fn format_line(
    timestamp: DateTime<Local>,
    severity: Severity,
    prefix: &str,
    message: &str,
) -> String {
    let message = strip_ansi(message).replace('\r', "").replace('\n', "\\n");
    let prefix = strip_ansi(prefix);

    if prefix.is_empty() {
        format!(
            "{} [{}] {}\n",
            timestamp.format(TIMESTAMP_FORMAT),
            severity.tag(),
            message
        )
    } else {
        format!(
            "{} [{}] {} {}\n",
            timestamp.format(TIMESTAMP_FORMAT),
            severity.tag(),
            prefix,
            message
        )
    }
}
