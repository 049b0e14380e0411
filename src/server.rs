use std::future::Future;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::net::TcpListener;
use tracing::{debug, error};

/// Upper bound on a single scrape, mirroring the HTTP read/write timeouts.
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("gather task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("scrape timed out")]
    Timeout,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("scrape failed: {}", self);
        let status = match self {
            Error::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Builds the scrape router serving `registry` at `path`.
///
/// `path` must start with `/`.
pub fn router(registry: Registry, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics))
        .with_state(registry)
}

async fn metrics(State(registry): State<Registry>) -> Result<Response, Error> {
    debug!("serving scrape");
    // Collectors block on the device query.
    let task = tokio::task::spawn_blocking(move || encode(&registry));
    let joined = tokio::time::timeout(SCRAPE_TIMEOUT, task)
        .await
        .map_err(|_| Error::Timeout)?;
    let (content_type, body) = joined??;
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

fn encode(registry: &Registry) -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buf = vec![];
    encoder.encode(&registry.gather(), &mut buf)?;
    Ok((encoder.format_type().to_string(), buf))
}

/// Binds the first of `addrs` that succeeds.
pub async fn bind(addrs: &[String]) -> std::io::Result<TcpListener> {
    let mut last = None;
    for addr in addrs {
        match TcpListener::bind(addr.as_str()).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                debug!("cannot bind {}: {}", addr, e);
                last = Some(e);
            }
        }
    }
    Err(last.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "no listen address")
    }))
}

pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
