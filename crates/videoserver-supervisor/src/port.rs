//! Ephemeral port allocation

use std::io;
use std::net::{IpAddr, Ipv4Addr, TcpListener};
use tracing::trace;

/// Hands out a TCP port for a new stream.
pub trait PortAllocator: Send {
    fn allocate(&mut self) -> io::Result<u16>;
}

/// Asks the operating system for a free port.
///
/// A socket is bound to port 0, the assigned port is read back and the socket
/// is closed again before the streamer binds it. Another process can grab the
/// port in between; that race is accepted.
#[derive(Debug, Clone)]
pub struct EphemeralPortAllocator {
    bind_ip: IpAddr,
}

impl EphemeralPortAllocator {
    pub fn new(bind_ip: IpAddr) -> Self {
        Self { bind_ip }
    }
}

impl Default for EphemeralPortAllocator {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl PortAllocator for EphemeralPortAllocator {
    fn allocate(&mut self) -> io::Result<u16> {
        let listener = TcpListener::bind((self.bind_ip, 0))?;
        let port = listener.local_addr()?.port();
        drop(listener);

        trace!(port, "Allocated ephemeral port");
        Ok(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_nonzero_port() {
        let mut ports = EphemeralPortAllocator::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port = ports.allocate().unwrap();
        assert_ne!(port, 0);

        // The probe socket is closed, so the port can be bound again
        assert!(TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok());
    }
}
