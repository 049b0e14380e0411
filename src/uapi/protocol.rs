use std::str::FromStr;

use super::Error;
use crate::device::{handshake_time, Device, Peer};
use crate::Key;

pub enum Request {
    Get,
}

impl Request {
    #[inline]
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Request::Get => b"get=1\n\n",
        }
    }
}

/// Response to a `get=1` request.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct GetDevice {
    pub peers: Vec<GetPeer>,
}

#[derive(Debug, Eq, PartialEq)]
pub struct GetPeer {
    pub public_key: Key,
    pub last_handshake_time_sec: u64,
    pub last_handshake_time_nsec: u32,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

impl GetPeer {
    fn new(public_key: Key) -> Self {
        Self {
            public_key,
            last_handshake_time_sec: 0,
            last_handshake_time_nsec: 0,
            tx_bytes: 0,
            rx_bytes: 0,
        }
    }
}

impl GetDevice {
    /// Parses the `key=value` lines of a get response, without the
    /// terminating empty line.
    pub fn parse<'a, I>(lines: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut device = GetDevice::default();
        let mut errno = None;

        for line in lines {
            let (key, value) = line.split_once('=').ok_or(Error::InvalidProtocol)?;
            match key {
                "errno" => errno = Some(parse_value::<i64>(key, value)?),
                "public_key" => device.peers.push(GetPeer::new(Key::from_hex(value)?)),
                // Interface level, not exported.
                "private_key" | "listen_port" | "fwmark" if device.peers.is_empty() => {}
                _ => {
                    let Some(peer) = device.peers.last_mut() else {
                        return Err(Error::InvalidProtocol);
                    };
                    match key {
                        "last_handshake_time_sec" => {
                            peer.last_handshake_time_sec = parse_value(key, value)?
                        }
                        "last_handshake_time_nsec" => {
                            peer.last_handshake_time_nsec = parse_value(key, value)?
                        }
                        "tx_bytes" => peer.tx_bytes = parse_value(key, value)?,
                        "rx_bytes" => peer.rx_bytes = parse_value(key, value)?,
                        _ => {} // preshared_key, endpoint, allowed_ip, ...
                    }
                }
            }
        }

        match errno {
            Some(0) => Ok(device),
            Some(n) => Err(Error::Errno(n)),
            None => Err(Error::InvalidProtocol),
        }
    }

    pub fn into_device(self, name: &str) -> Device {
        Device {
            name: name.to_string(),
            peers: self.peers.into_iter().map(Peer::from).collect(),
        }
    }
}

impl From<GetPeer> for Peer {
    fn from(p: GetPeer) -> Self {
        Peer {
            public_key: p.public_key,
            rx_bytes: p.rx_bytes,
            tx_bytes: p.tx_bytes,
            last_handshake_at: handshake_time(
                p.last_handshake_time_sec,
                p.last_handshake_time_nsec,
            ),
        }
    }
}

#[inline]
fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value.parse().map_err(|_| Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
