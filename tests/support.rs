#![allow(unused)]

use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

use wg_exporter::*;

pub const DEVICE: &str = "ns1-wg";

pub struct TestKit {}

impl TestKit {
    #[inline(always)]
    pub fn key(b: u8) -> Key {
        Key::new([b; 32])
    }

    #[inline(always)]
    pub fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    /// Two peers: P1 never handshaked, P2 handshaked at 1700000000.
    pub fn scenario() -> (Device, PeerNames) {
        let p1 = Peer::new(Self::key(1)).rx_bytes(100).tx_bytes(200);
        let p2 = Peer::new(Self::key(2)).last_handshake_at(Self::at(1_700_000_000));
        let names = [
            (p1.public_key.to_string(), "Cluster-0".to_string()),
            (p2.public_key.to_string(), "Cluster-1".to_string()),
        ]
        .into_iter()
        .collect();
        let device = Device {
            name: DEVICE.to_string(),
            peers: vec![p1, p2],
        };
        (device, names)
    }

    /// A unique, empty directory under the system temp dir.
    pub fn temp_dir(tag: &str) -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let dir = std::env::temp_dir().join(format!(
            "wg-exporter-{}-{}-{}",
            tag,
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

/// A device source returning a fixed snapshot, or failing on demand.
pub struct StubQuery {
    device: Mutex<Option<Device>>,
    queried: AtomicU64,
}

impl StubQuery {
    pub fn new(device: Device) -> Self {
        Self {
            device: Mutex::new(Some(device)),
            queried: AtomicU64::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            device: Mutex::new(None),
            queried: AtomicU64::new(0),
        }
    }

    pub fn set(&self, device: Option<Device>) {
        *self.device.lock().unwrap() = device;
    }

    #[inline(always)]
    pub fn queried(&self) -> u64 {
        self.queried.load(Ordering::Relaxed)
    }
}

impl DeviceQuery for StubQuery {
    fn device(&self, name: &str) -> Result<Device, LookupError> {
        self.queried.fetch_add(1, Ordering::Relaxed);
        match &*self.device.lock().unwrap() {
            Some(device) if device.name == name => Ok(device.clone()),
            _ => Err(LookupError::not_found(
                name,
                uapi::Error::DeviceNotFound(name.to_string()),
            )),
        }
    }
}

/// Serves one canned UAPI response per accepted connection, recording the
/// requests it receives.
pub struct StubUapi {
    pub dir: PathBuf,
    pub requests: std::sync::Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl StubUapi {
    pub fn spawn(iface: &str, response: &'static str, connections: usize) -> Self {
        use std::io::{BufRead, BufReader, Write};

        let dir = TestKit::temp_dir(iface);
        let listener = UnixListener::bind(uapi::socket_path(&dir, iface)).unwrap();
        let requests = std::sync::Arc::new(Mutex::new(vec![]));
        let recorded = requests.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..connections {
                let (mut socket, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(socket.try_clone().unwrap());
                let mut request = String::new();
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    request.push_str(&line);
                    if line == "\n" || line.is_empty() {
                        break;
                    }
                }
                recorded.lock().unwrap().push(request);
                socket.write_all(response.as_bytes()).unwrap();
            }
        });

        Self {
            dir,
            requests,
            handle,
        }
    }

    /// Accepts one connection and never answers it, holding the socket open
    /// for `hold`.
    pub fn stalled(iface: &str, hold: Duration) -> Self {
        let dir = TestKit::temp_dir(iface);
        let listener = UnixListener::bind(uapi::socket_path(&dir, iface)).unwrap();
        let requests = std::sync::Arc::new(Mutex::new(vec![]));

        let handle = std::thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            std::thread::sleep(hold);
            drop(socket);
        });

        Self {
            dir,
            requests,
            handle,
        }
    }

    pub fn client(&self) -> uapi::Client {
        uapi::Client::new()
            .socket_dir(&self.dir)
            .timeout(Duration::from_secs(2))
    }

    pub fn join(self) -> Vec<String> {
        self.handle.join().unwrap();
        let _ = std::fs::remove_dir_all(&self.dir);
        let requests = self.requests.lock().unwrap().clone();
        requests
    }
}
