//! Prometheus exporter for the per-peer statistics of a WireGuard device.
//!
//! A [`Collector`] queries the device through a [`DeviceQuery`] on every
//! scrape and maps each peer's counters to metrics labelled with the device
//! name, the peer's public key and its display name.

pub mod collector;
pub mod config;
mod device;
mod key;
mod names;
#[cfg(target_os = "linux")]
pub mod netlink;
pub mod server;
pub mod uapi;

pub use collector::{Collector, Sample};
pub use config::{Backend, Config};
pub use device::{Device, DeviceQuery, Fallback, LookupError, Peer};
pub use key::{Key, KeyError};
pub use names::PeerNames;
