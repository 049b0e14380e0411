use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::device::DeviceQuery;
use crate::{names, uapi};

/// Where device state is read from.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The UAPI socket if it exists, the kernel module otherwise.
    Auto,
    /// The in-kernel WireGuard module over netlink (Linux only).
    Kernel,
    /// A userspace implementation's UAPI socket.
    Userspace,
}

/// Prometheus exporter for WireGuard devices.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address for the WireGuard exporter; `:port` listens on all interfaces,
    /// IPv6 and IPv4 where available, IPv4 only otherwise.
    #[arg(long = "metrics.addr", default_value = ":9586")]
    pub metrics_addr: String,

    /// URL path for surfacing collected metrics.
    #[arg(
        long = "metrics.path",
        default_value = "/metrics",
        value_parser = parse_metrics_path
    )]
    pub metrics_path: String,

    /// Name of the WireGuard device to export.
    #[arg(long, default_value = "ns1-wg")]
    pub device: String,

    /// Source of the device state.
    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    pub backend: Backend,

    /// Directory holding the per-device UAPI sockets.
    #[arg(long = "uapi.socket-dir", default_value = uapi::SOCKET_DIR)]
    pub socket_dir: PathBuf,

    /// Timeout in seconds for a single device query.
    #[arg(
        long = "uapi.timeout",
        default_value_t = uapi::DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Prefix of the sequential display names assigned to peers at startup.
    #[arg(long, default_value = names::DEFAULT_PREFIX)]
    pub peer_name_prefix: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("metrics path must start with '/': {0:?}")]
    InvalidMetricsPath(String),
    #[error("the kernel backend is not supported on this platform")]
    KernelUnsupported,
}

impl Config {
    /// The addresses to try binding, in order. A bare `:port` expands to the
    /// dual-stack wildcard, then the IPv4 one for hosts without IPv6.
    pub fn listen_addrs(&self) -> Vec<String> {
        match self.metrics_addr.strip_prefix(':') {
            Some(port) => vec![format!("[::]:{}", port), format!("0.0.0.0:{}", port)],
            None => vec![self.metrics_addr.clone()],
        }
    }

    #[inline(always)]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn client(&self) -> uapi::Client {
        uapi::Client::new()
            .socket_dir(&self.socket_dir)
            .timeout(self.timeout())
    }

    /// The device source selected by `--backend`.
    pub fn query(&self) -> Result<Box<dyn DeviceQuery>, ConfigError> {
        match self.backend {
            Backend::Userspace => Ok(Box::new(self.client())),
            #[cfg(target_os = "linux")]
            Backend::Kernel => Ok(Box::new(crate::netlink::Client::new())),
            #[cfg(target_os = "linux")]
            Backend::Auto => Ok(Box::new(crate::device::Fallback::new(
                self.client(),
                crate::netlink::Client::new(),
            ))),
            #[cfg(not(target_os = "linux"))]
            Backend::Kernel => Err(ConfigError::KernelUnsupported),
            #[cfg(not(target_os = "linux"))]
            Backend::Auto => Ok(Box::new(self.client())),
        }
    }
}

fn parse_metrics_path(s: &str) -> Result<String, ConfigError> {
    if !s.starts_with('/') {
        return Err(ConfigError::InvalidMetricsPath(s.to_string()));
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["wireguard_exporter"]).unwrap();

        assert_eq!(config.metrics_addr, ":9586");
        assert_eq!(config.listen_addrs(), ["[::]:9586", "0.0.0.0:9586"]);
        assert_eq!(config.backend, Backend::Auto);
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(config.device, "ns1-wg");
        assert_eq!(config.socket_dir, PathBuf::from("/var/run/wireguard"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.peer_name_prefix, "Cluster-");
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "wireguard_exporter",
            "--metrics.addr",
            "127.0.0.1:9000",
            "--metrics.path=/wg",
            "--device",
            "wg0",
            "--backend",
            "userspace",
            "--uapi.socket-dir",
            "/tmp/wg",
            "--uapi.timeout",
            "2",
            "--peer-name-prefix",
            "peer-",
        ])
        .unwrap();

        assert_eq!(config.listen_addrs(), ["127.0.0.1:9000"]);
        assert_eq!(config.backend, Backend::Userspace);
        assert_eq!(config.metrics_path, "/wg");
        assert_eq!(config.device, "wg0");
        assert_eq!(config.socket_dir, PathBuf::from("/tmp/wg"));
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert_eq!(config.peer_name_prefix, "peer-");
    }

    #[test]
    fn test_invalid_flags() {
        let ret = Config::try_parse_from(["wireguard_exporter", "--metrics.path", "metrics"]);
        assert!(ret.is_err());
        let ret = Config::try_parse_from(["wireguard_exporter", "--uapi.timeout", "0"]);
        assert!(ret.is_err());
        let ret = Config::try_parse_from(["wireguard_exporter", "--backend", "netlink"]);
        assert!(ret.is_err());
    }

    #[test]
    fn test_query_backend() {
        let dir = std::env::temp_dir().join(format!("wg-exporter-query-{}", std::process::id()));
        let config = Config::try_parse_from([
            "wireguard_exporter",
            "--backend=userspace",
            "--uapi.socket-dir",
            dir.to_str().unwrap(),
        ])
        .unwrap();

        let e = config.query().unwrap().device("wg-none").unwrap_err();
        assert!(e.is_not_found());
        assert_eq!(e.cause().to_string(), "no such device: wg-none");
    }
}
