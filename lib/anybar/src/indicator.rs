use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::color::Color;
use crate::error::AnyBarError;
use crate::udp::UdpTransport;

/// Delivers a color token to an AnyBar instance.
pub trait Transport {
    fn send(&self, token: &str) -> Result<(), AnyBarError>;
}

impl<T: Transport + ?Sized> Transport for &'_ T {
    fn send(&self, token: &str) -> Result<(), AnyBarError> {
        T::send(self, token)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, token: &str) -> Result<(), AnyBarError> {
        T::send(self, token)
    }
}

/// Handle to one AnyBar widget, remembering the last color it was given.
pub struct AnyBar<T: Transport = UdpTransport> {
    transport: T,
    color: Mutex<Color>,
}

impl AnyBar<UdpTransport> {
    /// Connect to the widget listening on `port` on the loopback interface.
    pub fn connect(port: u16) -> Result<AnyBar<UdpTransport>, AnyBarError> {
        Ok(AnyBar::with_transport(UdpTransport::localhost(port)?))
    }
}

impl<T: Transport> AnyBar<T> {
    pub fn with_transport(transport: T) -> AnyBar<T> {
        AnyBar {
            transport,
            color: Mutex::new(Color::default()),
        }
    }

    pub fn color(&self) -> Color {
        *self.lock()
    }

    /// Send `color` to the widget. The remembered color only changes when
    /// the send succeeds.
    pub fn set_color(&self, color: Color) -> Result<(), AnyBarError> {
        let mut current = self.lock();
        self.transport.send(color.token())?;
        *current = color;
        Ok(())
    }

    /// Re-send the remembered color.
    pub fn refresh(&self) -> Result<(), AnyBarError> {
        let current = self.lock();
        self.transport.send(current.token())
    }

    /// Switch between `first` and `second`. Any other current color is
    /// replaced by `first`.
    pub fn toggle(&self, first: Color, second: Color) -> Result<Color, AnyBarError> {
        let mut current = self.lock();
        let next = if *current == first { second } else { first };
        self.transport.send(next.token())?;
        *current = next;
        Ok(next)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn lock(&self) -> MutexGuard<'_, Color> {
        self.color.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
