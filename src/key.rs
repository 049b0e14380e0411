use std::fmt::{Display, Formatter};
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as base64Encoding;
use base64::Engine;

pub const KEY_LEN: usize = 32;

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum KeyError {
    #[error("invalid key length")]
    InvalidLength,
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// A WireGuard Curve25519 public key.
///
/// The control channel carries keys as lowercase hex; the canonical string
/// form (`Display`, `FromStr`) is standard base64, as printed by `wg show`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    #[inline(always)]
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        if s.len() != KEY_LEN * 2 {
            return Err(KeyError::InvalidLength);
        }
        // `from_str_radix` tolerates a leading sign.
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(KeyError::InvalidHex);
        }
        let mut bytes = [0u8; KEY_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| KeyError::InvalidHex)?;
        }
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        let mut s = String::with_capacity(KEY_LEN * 2);
        for &b in &self.0 {
            let _ = write!(&mut s, "{:02x}", b);
        }
        s
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; KEY_LEN] = base64Encoding
            .decode(s)?
            .try_into()
            .map_err(|_| KeyError::InvalidLength)?;
        Ok(Self(bytes))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&base64Encoding.encode(self.0))
    }
}
