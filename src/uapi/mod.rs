//! Client side of the WireGuard cross-platform userspace API.
//!
//! Userspace implementations (wireguard-go, boringtun, wiretun) expose one
//! unix socket per interface under `/var/run/wireguard`. A `get=1` request
//! returns the interface and peer state as `key=value` lines.

mod connection;
mod error;
mod protocol;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use connection::Connection;
pub use error::Error;
pub use protocol::{GetDevice, GetPeer};

use crate::device::{Device, DeviceQuery, LookupError};

pub const SOCKET_DIR: &str = "/var/run/wireguard";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn socket_path<P: AsRef<Path>>(dir: P, iface: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.sock", iface))
}

/// Queries devices over their UAPI sockets. Each lookup opens a fresh
/// connection, so a `Client` can be shared freely.
#[derive(Debug, Clone)]
pub struct Client {
    socket_dir: PathBuf,
    timeout: Duration,
}

impl Client {
    pub fn new() -> Self {
        Self {
            socket_dir: PathBuf::from(SOCKET_DIR),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[inline(always)]
    pub fn socket_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.socket_dir = dir.into();
        self
    }

    #[inline(always)]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn get(&self, iface: &str) -> Result<Device, Error> {
        let path = socket_path(&self.socket_dir, iface);
        debug!("querying UAPI socket {:?}", path);
        let mut conn =
            Connection::connect(&path, self.timeout).map_err(|e| Error::from_io(iface, e))?;
        let resp = conn.get().map_err(|e| match e {
            Error::IO(e) => Error::from_io(iface, e),
            e => e,
        })?;
        debug!("UAPI returned {} peers for {}", resp.peers.len(), iface);
        Ok(resp.into_device(iface))
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceQuery for Client {
    fn device(&self, name: &str) -> Result<Device, LookupError> {
        self.get(name).map_err(|e| match e {
            Error::DeviceNotFound(_) => LookupError::not_found(name, e),
            e => LookupError::new(name, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_path() {
        assert_eq!(
            socket_path(SOCKET_DIR, "wg0").to_string_lossy().as_ref(),
            "/var/run/wireguard/wg0.sock",
        )
    }
}
