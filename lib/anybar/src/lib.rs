//! Client for the AnyBar menubar indicator.
//!
//! AnyBar listens on a local UDP port and changes its swatch whenever it
//! receives a datagram containing a color token. [`process`] launches and
//! quits AnyBar instances, each on its own port.

pub mod color;
pub mod error;
pub mod indicator;
pub mod process;
pub mod udp;

pub mod prelude {
    pub use crate::color::{Color, ALL_COLORS};
    pub use crate::error::AnyBarError;
    pub use crate::indicator::{AnyBar, Transport};
    pub use crate::process::{Instance, Instances, Tools};
    pub use crate::udp::{UdpTransport, DEFAULT_PORT};
}

pub use prelude::*;
