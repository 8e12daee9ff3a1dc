//! Desktop notifications through external programs.
//!
//! Two backends are supported, tried in order: `terminal-notifier` when it
//! is on the search path, then AppleScript through `osascript`. Backends are
//! looked up once when the [`Notifier`] is resolved.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::NotifyError;

pub const TERMINAL_NOTIFIER: &str = "terminal-notifier";
pub const OSASCRIPT: &str = "osascript";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub subtitle: Option<String>,
    pub message: String,
    pub sound: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Notification {
        Notification {
            title: title.into(),
            subtitle: None,
            message: message.into(),
            sound: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Notification {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn sound(mut self, sound: impl Into<String>) -> Notification {
        self.sound = Some(sound.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// A third-party notifier executable taking `-title`/`-message` flags.
    ExternalTool(PathBuf),
    /// An AppleScript interpreter running `display notification`.
    ScriptingFallback(PathBuf),
}

impl Backend {
    pub fn program(&self) -> &Path {
        match self {
            Backend::ExternalTool(program) | Backend::ScriptingFallback(program) => program,
        }
    }

    pub fn command(&self, notification: &Notification) -> Command {
        let mut command = Command::new(self.program());
        match self {
            Backend::ExternalTool(_) => {
                command
                    .arg("-title")
                    .arg(&notification.title)
                    .arg("-message")
                    .arg(&notification.message);
                if let Some(subtitle) = &notification.subtitle {
                    command.arg("-subtitle").arg(subtitle);
                }
                if let Some(sound) = &notification.sound {
                    command.arg("-sound").arg(sound);
                }
            }
            Backend::ScriptingFallback(_) => {
                command.arg("-e").arg(applescript(notification));
            }
        }
        command
    }

    pub fn notify(&self, notification: &Notification, timeout: Duration) -> Result<(), NotifyError> {
        let mut command = self.command(notification);
        run_with_timeout(&mut command, self.program(), timeout)
    }
}

/// The resolved chain of notification backends.
#[derive(Clone, Debug)]
pub struct Notifier {
    backends: Vec<Backend>,
    timeout: Duration,
}

impl Notifier {
    /// Look up both backends on `PATH`.
    pub fn resolve(timeout: Duration) -> Notifier {
        let backends = vec![
            which::which(TERMINAL_NOTIFIER).ok().map(Backend::ExternalTool),
            which::which(OSASCRIPT).ok().map(Backend::ScriptingFallback),
        ];
        Notifier::from_found(backends, timeout)
    }

    /// Look up both backends on an explicit search path.
    pub fn resolve_in(search_path: impl AsRef<OsStr>, timeout: Duration) -> Notifier {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let find = |name: &str| which::which_in(name, Some(search_path.as_ref()), &cwd).ok();
        let backends = vec![
            find(TERMINAL_NOTIFIER).map(Backend::ExternalTool),
            find(OSASCRIPT).map(Backend::ScriptingFallback),
        ];
        Notifier::from_found(backends, timeout)
    }

    pub fn with_backends(backends: Vec<Backend>, timeout: Duration) -> Notifier {
        Notifier { backends, timeout }
    }

    pub fn disabled() -> Notifier {
        Notifier::with_backends(Vec::new(), DEFAULT_TIMEOUT)
    }

    fn from_found(found: Vec<Option<Backend>>, timeout: Duration) -> Notifier {
        let backends: Vec<_> = found.into_iter().flatten().collect();
        tracing::debug!(?backends, "resolved notification backends");
        Notifier::with_backends(backends, timeout)
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn is_available(&self) -> bool {
        !self.backends.is_empty()
    }

    /// Try each backend in turn until one succeeds. Returns the last
    /// failure when none does.
    pub fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut last_error = NotifyError::Unavailable;

        for backend in &self.backends {
            match backend.notify(notification, self.timeout) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(
                        program = %backend.program().display(),
                        error = %err,
                        "notification backend failed"
                    );
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }
}

fn run_with_timeout(
    command: &mut Command,
    program: &Path,
    timeout: Duration,
) -> Result<(), NotifyError> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| NotifyError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                return Err(NotifyError::Status {
                    program: program.to_path_buf(),
                    status,
                })
            }
            Ok(None) if Instant::now() >= deadline => {
                reap(&mut child);
                return Err(NotifyError::Timeout {
                    program: program.to_path_buf(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                reap(&mut child);
                return Err(NotifyError::Spawn {
                    program: program.to_path_buf(),
                    source,
                });
            }
        }
    }
}

fn reap(child: &mut Child) {
    // already exited or unkillable; either way we stop waiting
    let _ = child.kill();
    let _ = child.wait();
}

fn applescript_string(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn applescript(notification: &Notification) -> String {
    let mut script = format!(
        "display notification {} with title {}",
        applescript_string(&notification.message),
        applescript_string(&notification.title)
    );
    if let Some(subtitle) = &notification.subtitle {
        script.push_str(" subtitle ");
        script.push_str(&applescript_string(subtitle));
    }
    if let Some(sound) = &notification.sound {
        script.push_str(" sound name ");
        script.push_str(&applescript_string(sound));
    }
    script
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn external_tool_arguments() {
        let backend = Backend::ExternalTool(PathBuf::from("/opt/bin/terminal-notifier"));
        let notification = Notification::new("app", "Disk full")
            .subtitle("Error")
            .sound("default");

        let command = backend.command(&notification);
        assert_eq!(OsStr::new("/opt/bin/terminal-notifier"), command.get_program());
        assert_eq!(
            vec!["-title", "app", "-message", "Disk full", "-subtitle", "Error", "-sound", "default"],
            args(&command)
        );
    }

    #[test]
    fn applescript_escapes_quotes() {
        let notification = Notification::new("say \"hi\"", r"C:\temp").subtitle("Warning");
        assert_eq!(
            r#"display notification "C:\\temp" with title "say \"hi\"" subtitle "Warning""#,
            applescript(&notification)
        );

        let backend = Backend::ScriptingFallback(PathBuf::from("/usr/bin/osascript"));
        let command = backend.command(&Notification::new("t", "m").sound("Glass"));
        assert_eq!(
            vec![
                "-e",
                r#"display notification "m" with title "t" sound name "Glass""#
            ],
            args(&command)
        );
    }

    #[cfg(unix)]
    #[test]
    fn reaped_child_is_gone() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        reap(&mut child);
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn disabled_notifier_reports_unavailable() {
        let notifier = Notifier::disabled();
        assert!(!notifier.is_available());
        assert!(matches!(
            notifier.notify(&Notification::new("t", "m")),
            Err(NotifyError::Unavailable)
        ));
    }

    #[test]
    fn empty_search_path_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = Notifier::resolve_in(dir.path(), DEFAULT_TIMEOUT);
        assert!(notifier.backends().is_empty());
    }
}
