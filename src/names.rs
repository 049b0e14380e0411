use std::collections::HashMap;

use crate::Device;

pub const DEFAULT_PREFIX: &str = "Cluster-";

/// Display names for peers, keyed by the canonical public key string.
///
/// Built once at startup and read-only afterwards. A key with no entry
/// resolves to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerNames(HashMap<String, String>);

impl PeerNames {
    /// Assigns `<prefix>0`, `<prefix>1`, ... to the device's peers in order
    /// of their public keys, so the same peer set always yields the same
    /// names regardless of the order the device lists them in.
    pub fn sequential(device: &Device, prefix: &str) -> Self {
        let mut keys: Vec<String> = device
            .peers
            .iter()
            .map(|p| p.public_key.to_string())
            .collect();
        keys.sort_unstable();
        keys.dedup();

        keys.into_iter()
            .enumerate()
            .map(|(i, key)| (key, format!("{}{}", prefix, i)))
            .collect()
    }

    #[inline]
    pub fn get(&self, public_key: &str) -> &str {
        self.0.get(public_key).map(String::as_str).unwrap_or("")
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for PeerNames {
    fn from(m: HashMap<String, String>) -> Self {
        Self(m)
    }
}

impl From<Option<HashMap<String, String>>> for PeerNames {
    fn from(m: Option<HashMap<String, String>>) -> Self {
        Self(m.unwrap_or_default())
    }
}

impl FromIterator<(String, String)> for PeerNames {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
