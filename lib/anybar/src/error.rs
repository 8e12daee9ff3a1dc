use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnyBarError {
    #[error("unknown AnyBar color: {0:?}")]
    UnknownColor(String),

    #[error("could not bind a local socket for AnyBar: {0}")]
    Bind(#[source] io::Error),

    #[error("could not send to AnyBar at {endpoint}: {source}")]
    Send {
        endpoint: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("{tool} not found: {source}")]
    ToolMissing {
        tool: &'static str,
        #[source]
        source: which::Error,
    },

    #[error("could not run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exited with {status}", .program.display())]
    Status { program: PathBuf, status: ExitStatus },

    #[error("no free AnyBar port")]
    PortsExhausted,

    #[error("AnyBar on port {port} did not start")]
    LaunchTimeout { port: u16 },

    #[error("AnyBar not running")]
    NotRunning,
}
