use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use crate::error::AnyBarError;
use crate::indicator::Transport;

pub const DEFAULT_PORT: u16 = 1738;

/// Fire-and-forget datagrams to an AnyBar endpoint.
pub struct UdpTransport {
    socket: UdpSocket,
    endpoint: SocketAddr,
}

impl UdpTransport {
    pub fn new(endpoint: SocketAddr) -> Result<UdpTransport, AnyBarError> {
        let socket =
            UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).map_err(AnyBarError::Bind)?;
        Ok(UdpTransport { socket, endpoint })
    }

    pub fn localhost(port: u16) -> Result<UdpTransport, AnyBarError> {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, port)))
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }
}

impl Transport for UdpTransport {
    fn send(&self, token: &str) -> Result<(), AnyBarError> {
        tracing::trace!(endpoint = %self.endpoint, token, "sending AnyBar color");
        self.socket
            .send_to(token.as_bytes(), self.endpoint)
            .map(|_| ())
            .map_err(|source| AnyBarError::Send {
                endpoint: self.endpoint,
                source,
            })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::color::Color;
    use crate::indicator::AnyBar;

    #[test]
    fn sends_token_datagram() {
        let listener = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let port = listener.local_addr().unwrap().port();

        let bar = AnyBar::connect(port).unwrap();
        assert_eq!(port, bar.transport().endpoint().port());
        bar.set_color(Color::Exclamation).unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = listener.recv_from(&mut buf).unwrap();
        assert_eq!(b"exclamation", &buf[..len]);
    }
}
