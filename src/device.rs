use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::Key;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A point-in-time snapshot of a WireGuard device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub peers: Vec<Peer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub public_key: Key,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// `None` if the peer never completed a handshake.
    pub last_handshake_at: Option<SystemTime>,
}

impl Peer {
    #[inline(always)]
    pub fn new(public_key: Key) -> Self {
        Self {
            public_key,
            rx_bytes: 0,
            tx_bytes: 0,
            last_handshake_at: None,
        }
    }

    #[inline(always)]
    pub fn rx_bytes(mut self, n: u64) -> Self {
        self.rx_bytes = n;
        self
    }

    #[inline(always)]
    pub fn tx_bytes(mut self, n: u64) -> Self {
        self.tx_bytes = n;
        self
    }

    #[inline(always)]
    pub fn last_handshake_at(mut self, at: SystemTime) -> Self {
        self.last_handshake_at = Some(at);
        self
    }

    /// Whole seconds since the UNIX epoch of the last handshake, 0 if none.
    pub fn last_handshake_secs(&self) -> u64 {
        self.last_handshake_at
            .and_then(|at| at.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Converts the UAPI `last_handshake_time_{sec,nsec}` pair, where both zero
/// means the peer never handshaked.
pub(crate) fn handshake_time(secs: u64, nsecs: u32) -> Option<SystemTime> {
    if secs == 0 && nsecs == 0 {
        return None;
    }
    SystemTime::UNIX_EPOCH.checked_add(Duration::new(secs, nsecs))
}

#[derive(thiserror::Error, Debug)]
#[error("failed to look up device {device:?}: {cause}")]
pub struct LookupError {
    device: String,
    cause: BoxError,
    not_found: bool,
}

impl LookupError {
    pub fn new(device: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            device: device.into(),
            cause: cause.into(),
            not_found: false,
        }
    }

    /// The source has no device with this name.
    pub fn not_found(device: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            not_found: true,
            ..Self::new(device, cause)
        }
    }

    #[inline(always)]
    pub fn is_not_found(&self) -> bool {
        self.not_found
    }

    #[inline(always)]
    pub fn device(&self) -> &str {
        &self.device
    }

    #[inline(always)]
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}

/// Fetches the live state of a device by name.
///
/// Implementations must not cache: every call reflects the device at call
/// time. The call may block.
pub trait DeviceQuery: Send + Sync {
    fn device(&self, name: &str) -> Result<Device, LookupError>;
}

impl<Q> DeviceQuery for Arc<Q>
where
    Q: DeviceQuery + ?Sized,
{
    fn device(&self, name: &str) -> Result<Device, LookupError> {
        (**self).device(name)
    }
}

impl<Q> DeviceQuery for Box<Q>
where
    Q: DeviceQuery + ?Sized,
{
    fn device(&self, name: &str) -> Result<Device, LookupError> {
        (**self).device(name)
    }
}

/// Asks `primary` first and `secondary` only when `primary` has no such
/// device. Any other `primary` failure is returned as is.
#[derive(Debug, Clone)]
pub struct Fallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> Fallback<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P, S> DeviceQuery for Fallback<P, S>
where
    P: DeviceQuery,
    S: DeviceQuery,
{
    fn device(&self, name: &str) -> Result<Device, LookupError> {
        match self.primary.device(name) {
            Err(e) if e.is_not_found() => {
                debug!("{}, trying next backend", e);
                self.secondary.device(name)
            }
            ret => ret,
        }
    }
}
