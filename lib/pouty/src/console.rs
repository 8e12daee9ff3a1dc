use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::severity::Stream;

/// The standard output and error streams a printer writes to.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    hanging: bool,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Console {
        Console {
            out: Box::new(out),
            err: Box::new(err),
            hanging: false,
        }
    }

    pub fn stdio() -> Console {
        Console::new(io::stdout(), io::stderr())
    }

    /// A console writing to in-memory buffers, and a handle to read them.
    pub fn capture() -> (Console, Capture) {
        let capture = Capture::default();
        let console = Console::new(capture.out.clone(), capture.err.clone());
        (console, capture)
    }

    pub fn write(&mut self, stream: Stream, bytes: &[u8]) -> io::Result<()> {
        let writer = match stream {
            Stream::Stdout => &mut self.out,
            Stream::Stderr => &mut self.err,
        };
        writer.write_all(bytes)?;
        writer.flush()
    }

    /// Raw output to stdout that may leave the cursor mid-line.
    pub fn write_raw(&mut self, text: &str) -> io::Result<()> {
        self.write(Stream::Stdout, text.as_bytes())?;
        if !text.is_empty() {
            self.hanging = !text.ends_with('\n');
        }
        Ok(())
    }

    /// Terminate a line left open by [`write_raw`](Console::write_raw).
    pub fn resolve_hanging(&mut self) -> io::Result<bool> {
        if !self.hanging {
            return Ok(false);
        }
        self.hanging = false;
        self.write(Stream::Stdout, b"\n")?;
        Ok(true)
    }

    pub fn is_hanging(&self) -> bool {
        self.hanging
    }
}

/// Shared in-memory sink.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read side of [`Console::capture`].
#[derive(Clone, Default)]
pub struct Capture {
    out: SharedBuffer,
    err: SharedBuffer,
}

impl Capture {
    pub fn stdout(&self) -> String {
        self.out.contents()
    }

    pub fn stderr(&self) -> String {
        self.err.contents()
    }

    pub fn clear(&self) {
        self.out.clear();
        self.err.clear();
    }
}
