#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use pouty::{Capture, Console, Notifier, Printer, PrinterConfig};

pub fn captured(config: PrinterConfig, notifier: Notifier) -> (Printer, Capture) {
    let (console, capture) = Console::capture();
    let printer = Printer::configure_with(config, console, notifier).expect("configure printer");
    (printer, capture)
}

/// Write an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn fake_program(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake program");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake program");
    path
}

/// A fake program that writes each of its arguments on its own line to
/// `record`.
#[cfg(unix)]
pub fn recording_program(dir: &Path, name: &str, record: &Path) -> PathBuf {
    fake_program(
        dir,
        name,
        &format!("printf '%s\\n' \"$@\" > '{}'", record.display()),
    )
}

pub fn recorded_args(record: &Path) -> Option<Vec<String>> {
    let contents = fs::read_to_string(record).ok()?;
    Some(contents.lines().map(str::to_string).collect())
}
