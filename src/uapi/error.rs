#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no such device: {0}")]
    DeviceNotFound(String),
    #[error("permission denied")]
    PermissionDenied,
    #[error("timed out waiting for the device")]
    Timeout,
    #[error("invalid protocol")]
    InvalidProtocol,
    #[error("invalid key: {0}")]
    InvalidKey(#[from] crate::key::KeyError),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("device returned errno {0}")]
    Errno(i64),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

impl Error {
    /// Classifies an IO error raised while talking to the device socket.
    pub(super) fn from_io(device: &str, e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::NotFound | ErrorKind::ConnectionRefused => {
                Error::DeviceNotFound(device.to_string())
            }
            ErrorKind::PermissionDenied => Error::PermissionDenied,
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
            _ => Error::IO(e),
        }
    }
}
