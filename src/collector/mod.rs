mod sample;

use std::sync::Arc;

use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use tracing::debug;

pub use sample::{families, Descriptor, Sample, ValueType};

use crate::device::DeviceQuery;
use crate::PeerNames;

pub const PEER_RECEIVE_BYTES: &str = "wireguard_peer_receive_bytes_total";
pub const PEER_TRANSMIT_BYTES: &str = "wireguard_peer_transmit_bytes_total";
pub const PEER_LAST_HANDSHAKE: &str = "wireguard_peer_last_handshake_seconds";

// Keyed on both device and public key since a peer can belong to several
// devices.
const LABELS: [&str; 3] = ["device", "public_key", "peer_name"];

/// Exports per-peer statistics of one WireGuard device.
///
/// Every [`collect`](Collector::collect) queries the device afresh; nothing
/// is cached or accumulated between scrapes.
///
/// # Examples
///
/// ```no_run
/// use wg_exporter::{uapi, Collector, PeerNames};
///
/// let collector = Collector::new(uapi::Client::new(), "wg0", PeerNames::default()).unwrap();
/// let registry = prometheus::Registry::new();
/// registry.register(Box::new(collector)).unwrap();
/// ```
pub struct Collector<Q> {
    peer_receive_bytes: Arc<Descriptor>,
    peer_transmit_bytes: Arc<Descriptor>,
    peer_last_handshake: Arc<Descriptor>,

    query: Q,
    device: String,
    names: PeerNames,
}

impl<Q> Collector<Q>
where
    Q: DeviceQuery,
{
    pub fn new(
        query: Q,
        device: impl Into<String>,
        names: impl Into<PeerNames>,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            peer_receive_bytes: Arc::new(Descriptor::new(
                PEER_RECEIVE_BYTES,
                "Number of bytes received from a given peer.",
                &LABELS,
                ValueType::Counter,
            )?),
            peer_transmit_bytes: Arc::new(Descriptor::new(
                PEER_TRANSMIT_BYTES,
                "Number of bytes transmitted to a given peer.",
                &LABELS,
                ValueType::Counter,
            )?),
            peer_last_handshake: Arc::new(Descriptor::new(
                PEER_LAST_HANDSHAKE,
                "UNIX timestamp for the last handshake with a given peer.",
                &LABELS,
                ValueType::Gauge,
            )?),
            query,
            device: device.into(),
            names: names.into(),
        })
    }

    pub fn describe(&self) -> Vec<&Descriptor> {
        vec![
            self.peer_receive_bytes.as_ref(),
            self.peer_transmit_bytes.as_ref(),
            self.peer_last_handshake.as_ref(),
        ]
    }

    /// Queries the device and returns three samples per peer, in the order
    /// the device lists its peers. If the query fails, returns one invalid
    /// marker per descriptor instead.
    pub fn collect(&self) -> Vec<Sample> {
        let device = match self.query.device(&self.device) {
            Ok(device) => device,
            Err(e) => {
                let e = Arc::new(e);
                return vec![
                    Sample::invalid(&self.peer_receive_bytes, Arc::clone(&e)),
                    Sample::invalid(&self.peer_transmit_bytes, Arc::clone(&e)),
                    Sample::invalid(&self.peer_last_handshake, e),
                ];
            }
        };
        debug!("collecting {} peers of {}", device.peers.len(), device.name);

        let mut samples = Vec::with_capacity(device.peers.len() * 3);
        for peer in &device.peers {
            let public_key = peer.public_key.to_string();
            let peer_name = self.names.get(&public_key).to_string();
            let labels = vec![device.name.clone(), public_key, peer_name];

            samples.push(Sample::new(
                &self.peer_receive_bytes,
                peer.rx_bytes as f64,
                labels.clone(),
            ));
            samples.push(Sample::new(
                &self.peer_transmit_bytes,
                peer.tx_bytes as f64,
                labels.clone(),
            ));
            samples.push(Sample::new(
                &self.peer_last_handshake,
                peer.last_handshake_secs() as f64,
                labels,
            ));
        }
        samples
    }
}

impl<Q> prometheus::core::Collector for Collector<Q>
where
    Q: DeviceQuery,
{
    fn desc(&self) -> Vec<&Desc> {
        self.describe().into_iter().map(Descriptor::desc).collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        families(&Collector::collect(self))
    }
}
