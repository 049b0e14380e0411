//! Kernel WireGuard devices, queried over generic netlink.

use std::time::Duration;

use tracing::debug;
use wireguard_uapi::{DeviceInterface, WgSocket};

use crate::device::{handshake_time, Device, DeviceQuery, LookupError, Peer};
use crate::key::{Key, KEY_LEN};

/// Queries the in-kernel WireGuard module. Each lookup opens a fresh netlink
/// socket, so a `Client` can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct Client {}

impl Client {
    pub fn new() -> Self {
        Self {}
    }
}

impl DeviceQuery for Client {
    fn device(&self, name: &str) -> Result<Device, LookupError> {
        let mut socket = WgSocket::connect().map_err(|e| LookupError::new(name, e.to_string()))?;
        let device = socket
            .get_device(DeviceInterface::from_name(name))
            .map_err(|e| LookupError::new(name, e.to_string()))?;
        debug!("netlink returned {} peers for {}", device.peers.len(), name);

        let peers = device
            .peers
            .iter()
            .map(|p| peer(p.public_key, p.rx_bytes, p.tx_bytes, p.last_handshake_time))
            .collect();
        Ok(Device {
            name: name.to_string(),
            peers,
        })
    }
}

/// The kernel reports a zero handshake time for a peer that never
/// handshaked.
fn peer(public_key: [u8; KEY_LEN], rx: u64, tx: u64, last_handshake: Duration) -> Peer {
    Peer {
        public_key: Key::new(public_key),
        rx_bytes: rx,
        tx_bytes: tx,
        last_handshake_at: handshake_time(last_handshake.as_secs(), last_handshake.subsec_nanos()),
    }
}
