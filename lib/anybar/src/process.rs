//! Launching and quitting AnyBar application instances.
//!
//! Each instance listens on its own port. A new instance gets
//! [`DEFAULT_PORT`] plus the number of AnyBar processes already running, and
//! is told its port through the `ANYBAR_PORT` environment variable.

use std::convert::TryFrom;
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::color::Color;
use crate::error::AnyBarError;
use crate::indicator::AnyBar;
use crate::udp::DEFAULT_PORT;

pub const APP_NAME: &str = "AnyBar";
pub const PORT_VARIABLE: &str = "ANYBAR_PORT";

const PGREP: &str = "pgrep";
const OPEN: &str = "open";
const KILL: &str = "kill";
const KILLALL: &str = "killall";

pub const LAUNCH_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The system programs used to find, launch and stop AnyBar.
#[derive(Clone, Debug)]
pub struct Tools {
    pgrep: PathBuf,
    open: PathBuf,
    kill: PathBuf,
    killall: PathBuf,
}

impl Tools {
    pub fn resolve() -> Result<Tools, AnyBarError> {
        Tools::find_with(|tool| which::which(tool))
    }

    pub fn resolve_in(search_path: impl AsRef<OsStr>) -> Result<Tools, AnyBarError> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Tools::find_with(|tool| which::which_in(tool, Some(search_path.as_ref()), &cwd))
    }

    fn find_with(
        find: impl Fn(&'static str) -> Result<PathBuf, which::Error>,
    ) -> Result<Tools, AnyBarError> {
        let lookup = |tool: &'static str| {
            find(tool).map_err(|source| AnyBarError::ToolMissing { tool, source })
        };
        Ok(Tools {
            pgrep: lookup(PGREP)?,
            open: lookup(OPEN)?,
            kill: lookup(KILL)?,
            killall: lookup(KILLALL)?,
        })
    }

    /// Process ids of every running AnyBar, oldest first.
    pub fn running(&self) -> Result<Vec<u32>, AnyBarError> {
        let output = Command::new(&self.pgrep)
            .arg("-x")
            .arg(APP_NAME)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| AnyBarError::Spawn {
                program: self.pgrep.clone(),
                source,
            })?;

        // pgrep exits with 1 when nothing matched
        match output.status.code() {
            Some(0) | Some(1) => {}
            _ => {
                return Err(AnyBarError::Status {
                    program: self.pgrep.clone(),
                    status: output.status,
                })
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect())
    }

    fn launch(&self, port: u16) -> Result<(), AnyBarError> {
        let mut command = Command::new(&self.open);
        command
            .args(&["-n", "-a", APP_NAME])
            .env(PORT_VARIABLE, port.to_string());
        run(&mut command, &self.open)
    }

    fn hangup(&self, pid: u32) -> Result<(), AnyBarError> {
        let mut command = Command::new(&self.kill);
        command.arg("-HUP").arg(pid.to_string());
        run(&mut command, &self.kill)
    }

    fn kill_all(&self) -> Result<(), AnyBarError> {
        let mut command = Command::new(&self.killall);
        command.arg(APP_NAME);
        match run(&mut command, &self.killall) {
            // nothing left to kill
            Err(AnyBarError::Status { status, .. }) if status.code() == Some(1) => Ok(()),
            other => other,
        }
    }
}

fn run(command: &mut Command, program: &Path) -> Result<(), AnyBarError> {
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| AnyBarError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(AnyBarError::Status {
            program: program.to_path_buf(),
            status,
        })
    }
}

/// One launched AnyBar application.
pub struct Instance {
    pid: u32,
    port: u16,
    bar: AnyBar,
}

impl Instance {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn bar(&self) -> &AnyBar {
        &self.bar
    }
}

/// The AnyBar instances launched by this process, most recent last.
pub struct Instances {
    tools: Tools,
    launch_timeout: Duration,
    instances: Mutex<Vec<Instance>>,
}

impl Instances {
    pub fn new(tools: Tools) -> Instances {
        Instances::with_launch_timeout(tools, LAUNCH_TIMEOUT)
    }

    pub fn with_launch_timeout(tools: Tools, launch_timeout: Duration) -> Instances {
        Instances {
            tools,
            launch_timeout,
            instances: Mutex::new(Vec::new()),
        }
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Launch a new AnyBar on the next free port. Returns its pid and port.
    pub fn start(&self) -> Result<(u32, u16), AnyBarError> {
        let before = self.tools.running()?;
        let port = u16::try_from(before.len())
            .ok()
            .and_then(|count| DEFAULT_PORT.checked_add(count))
            .ok_or(AnyBarError::PortsExhausted)?;

        self.tools.launch(port)?;
        let pid = self.wait_for_new(&before, port)?;
        let bar = AnyBar::connect(port)?;
        tracing::debug!(pid, port, "started AnyBar");

        self.lock().push(Instance { pid, port, bar });
        Ok((pid, port))
    }

    fn wait_for_new(&self, before: &[u32], port: u16) -> Result<u32, AnyBarError> {
        let deadline = Instant::now() + self.launch_timeout;
        loop {
            let started = self
                .tools
                .running()?
                .into_iter()
                .find(|pid| !before.contains(pid));
            match started {
                Some(pid) => return Ok(pid),
                None if Instant::now() >= deadline => {
                    return Err(AnyBarError::LaunchTimeout { port })
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn ports(&self) -> Vec<u16> {
        self.lock().iter().map(Instance::port).collect()
    }

    /// Set the color of the most recent instance.
    pub fn set_color(&self, color: Color) -> Result<(), AnyBarError> {
        let instances = self.lock();
        let latest = instances.last().ok_or(AnyBarError::NotRunning)?;
        latest.bar.set_color(color)
    }

    /// Toggle the most recent instance between two colors.
    pub fn toggle(&self, first: Color, second: Color) -> Result<Color, AnyBarError> {
        let instances = self.lock();
        let latest = instances.last().ok_or(AnyBarError::NotRunning)?;
        latest.bar.toggle(first, second)
    }

    /// Quit one instance. If it cannot be signalled, every AnyBar is shut
    /// down instead.
    pub fn quit(&self, pid: u32) -> Result<(), AnyBarError> {
        let removed = {
            let mut instances = self.lock();
            let index = instances.iter().position(|instance| instance.pid == pid);
            index.map(|index| instances.remove(index))
        };
        if removed.is_none() {
            tracing::debug!(pid, "quitting an AnyBar this process did not start");
        }

        if let Err(err) = self.tools.hangup(pid) {
            tracing::debug!(pid, error = %err, "hangup failed, quitting all AnyBars");
            return self.quit_all();
        }
        Ok(())
    }

    /// Quit every launched instance, newest first, then any AnyBar left over
    /// from other processes.
    pub fn quit_all(&self) -> Result<(), AnyBarError> {
        let instances: Vec<_> = self.lock().drain(..).collect();
        for instance in instances.iter().rev() {
            if let Err(err) = self.tools.hangup(instance.pid) {
                tracing::debug!(pid = instance.pid, error = %err, "hangup failed");
            }
        }
        self.tools.kill_all()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Instance>> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(all(test, unix))]
mod test {
    use std::fs;
    use std::net::UdpSocket;
    use std::os::unix::fs::PermissionsExt;

    use serial_test::serial;

    use super::*;

    fn script(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Fake process tools keeping the "running" pids in `<dir>/pids`.
    fn fake_tools(dir: &Path) -> Tools {
        let state = dir.display();
        script(
            dir,
            PGREP,
            &format!(
                "if [ -s '{0}/pids' ]; then cat '{0}/pids'; else exit 1; fi",
                state
            ),
        );
        script(
            dir,
            OPEN,
            &format!(
                "printf '%s\\n' \"$* $ANYBAR_PORT\" >> '{0}/opened'\n\
                 echo $((1000 + $(wc -l < '{0}/opened'))) >> '{0}/pids'",
                state
            ),
        );
        script(
            dir,
            KILL,
            &format!(
                "echo \"$@\" >> '{0}/killed'\n\
                 grep -v \"^$2\\$\" '{0}/pids' > '{0}/pids.tmp'\n\
                 mv '{0}/pids.tmp' '{0}/pids'",
                state
            ),
        );
        script(
            dir,
            KILLALL,
            &format!("echo \"$@\" >> '{0}/killall'\n: > '{0}/pids'", state),
        );
        Tools::resolve_in(dir).unwrap()
    }

    fn lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    #[serial]
    fn missing_tools() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Tools::resolve_in(dir.path()),
            Err(AnyBarError::ToolMissing { tool: PGREP, .. })
        ));
    }

    #[test]
    #[serial]
    fn start_uses_next_port() {
        let dir = tempfile::tempdir().unwrap();
        // one AnyBar from another process is already up
        fs::write(dir.path().join("pids"), "999\n").unwrap();
        let instances = Instances::new(fake_tools(dir.path()));

        assert_eq!((1001, DEFAULT_PORT + 1), instances.start().unwrap());
        assert_eq!((1002, DEFAULT_PORT + 2), instances.start().unwrap());

        assert_eq!(vec![DEFAULT_PORT + 1, DEFAULT_PORT + 2], instances.ports());
        assert_eq!(
            vec!["-n -a AnyBar 1739".to_string(), "-n -a AnyBar 1740".into()],
            lines(&dir.path().join("opened"))
        );
    }

    #[test]
    #[serial]
    fn launch_that_never_shows_up() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_tools(dir.path());
        script(dir.path(), OPEN, "exit 0");

        let instances = Instances::with_launch_timeout(tools, Duration::from_millis(100));
        assert!(matches!(
            instances.start(),
            Err(AnyBarError::LaunchTimeout { port: DEFAULT_PORT })
        ));
        assert!(instances.is_empty());
    }

    #[test]
    #[serial]
    fn colors_go_to_latest_instance() {
        let dir = tempfile::tempdir().unwrap();
        let instances = Instances::new(fake_tools(dir.path()));
        assert!(matches!(
            instances.toggle(Color::Green, Color::Purple),
            Err(AnyBarError::NotRunning)
        ));

        instances.start().unwrap();
        instances.start().unwrap();
        {
            let latest = instances.lock();
            assert_eq!(DEFAULT_PORT + 1, latest[1].port());
        }

        assert_eq!(Color::Green, instances.toggle(Color::Green, Color::Purple).unwrap());
        assert_eq!(Color::Purple, instances.toggle(Color::Green, Color::Purple).unwrap());
        instances.set_color(Color::Red).unwrap();

        let guard = instances.lock();
        assert_eq!(Color::White, guard[0].bar().color());
        assert_eq!(Color::Red, guard[1].bar().color());
    }

    #[test]
    #[serial]
    fn latest_instance_receives_datagrams() {
        let dir = tempfile::tempdir().unwrap();
        let instances = Instances::new(fake_tools(dir.path()));
        instances.start().unwrap();

        // stand in for the widget by rebinding the port it was given
        let widget = match UdpSocket::bind(("127.0.0.1", DEFAULT_PORT)) {
            Ok(widget) => widget,
            Err(_) => return,
        };
        widget
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        instances.set_color(Color::Yellow).unwrap();

        let mut buf = [0u8; 16];
        let len = widget.recv(&mut buf).unwrap();
        assert_eq!(b"yellow", &buf[..len]);
    }

    #[test]
    #[serial]
    fn quit_hangs_up_one_instance() {
        let dir = tempfile::tempdir().unwrap();
        let instances = Instances::new(fake_tools(dir.path()));
        let (first, _) = instances.start().unwrap();
        let (second, _) = instances.start().unwrap();

        instances.quit(first).unwrap();

        assert_eq!(1, instances.len());
        assert_eq!(vec![format!("-HUP {}", first)], lines(&dir.path().join("killed")));
        assert_eq!(vec![second.to_string()], lines(&dir.path().join("pids")));
        assert!(lines(&dir.path().join("killall")).is_empty());
    }

    #[test]
    #[serial]
    fn failed_hangup_quits_everything() {
        let dir = tempfile::tempdir().unwrap();
        let instances = Instances::new(fake_tools(dir.path()));
        let (first, _) = instances.start().unwrap();
        instances.start().unwrap();

        script(dir.path(), KILL, "exit 1");
        instances.quit(first).unwrap();

        assert!(instances.is_empty());
        assert_eq!(vec!["AnyBar".to_string()], lines(&dir.path().join("killall")));
        assert!(lines(&dir.path().join("pids")).is_empty());
    }

    #[test]
    #[serial]
    fn quit_all_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let instances = Instances::new(fake_tools(dir.path()));
        let (first, _) = instances.start().unwrap();
        let (second, _) = instances.start().unwrap();

        instances.quit_all().unwrap();

        assert!(instances.is_empty());
        assert_eq!(
            vec![format!("-HUP {}", second), format!("-HUP {}", first)],
            lines(&dir.path().join("killed"))
        );
        assert_eq!(vec!["AnyBar".to_string()], lines(&dir.path().join("killall")));
    }
}
