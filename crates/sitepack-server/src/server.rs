//! HTTP front end for the asset registry.

use std::{
    io,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_server::tls_rustls::RustlsConfig;
use headers::{ETag, HeaderMapExt, IfModifiedSince, IfNoneMatch, IfRange, LastModified};
use http::{
    HeaderMap, HeaderValue, StatusCode, Uri,
    header::{
        ACCEPT_ENCODING, ACCEPT_RANGES, CONTENT_ENCODING, CONTENT_RANGE, CONTENT_TYPE, RANGE,
        VARY,
    },
};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{
    range::{self, ByteRange},
    registry::{Asset, Registry},
};

/// Shared, read-only request state.
#[derive(Debug)]
pub struct ServerState {
    registry: Arc<Registry>,
    last_modified: SystemTime,
}

impl ServerState {
    /// Create server state. `started` is truncated to whole seconds and
    /// used as `Last-Modified` for every asset.
    pub fn new(registry: Arc<Registry>, started: SystemTime) -> Self {
        Self {
            registry,
            last_modified: truncate_to_seconds(started),
        }
    }
}

fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => UNIX_EPOCH + Duration::from_secs(since.as_secs()),
        Err(_) => UNIX_EPOCH,
    }
}

/// TLS certificate and key, both PEM encoded.
#[derive(Debug, Clone)]
pub struct TlsFiles {
    /// Certificate chain.
    pub cert: PathBuf,

    /// Private key.
    pub key: PathBuf,
}

/// Create the asset router. Every path and method goes to the registry.
pub fn create_router(registry: Arc<Registry>, started: SystemTime) -> Router {
    Router::new()
        .fallback(serve_asset)
        .with_state(Arc::new(ServerState::new(registry, started)))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve `app` until the process is stopped.
pub async fn serve(app: Router, addr: SocketAddr, tls: Option<TlsFiles>) -> io::Result<()> {
    match tls {
        Some(tls) => {
            let config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!(%addr, "serving over https");
            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            info!(addr = %listener.local_addr()?, "serving over http");
            axum::serve(listener, app).await
        }
    }
}

async fn serve_asset(
    State(state): State<Arc<ServerState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let Ok(path) = percent_decode_str(uri.path()).decode_utf8() else {
        debug!(path = uri.path(), "request path is not UTF-8 once decoded");
        return StatusCode::NOT_FOUND.into_response();
    };
    match state.registry.get(&path) {
        Some(asset) => respond(asset, &headers, state.last_modified),
        None => {
            debug!(path = %path, "no asset registered");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn accepts_gzip(request: &HeaderMap) -> bool {
    request
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("gzip"))
}

/// `If-None-Match` takes precedence; `If-Modified-Since` is only
/// consulted without it.
fn is_not_modified(request: &HeaderMap, etag: &ETag, last_modified: SystemTime) -> bool {
    if let Some(if_none_match) = request.typed_get::<IfNoneMatch>() {
        return !if_none_match.precondition_passes(etag);
    }
    request
        .typed_get::<IfModifiedSince>()
        .is_some_and(|since| !since.is_modified(last_modified))
}

fn range_applies(request: &HeaderMap, etag: &ETag, last_modified: SystemTime) -> bool {
    let last_modified = LastModified::from(last_modified);
    request
        .typed_get::<IfRange>()
        .is_none_or(|if_range| !if_range.is_modified(Some(etag), Some(&last_modified)))
}

fn respond(asset: &Asset, request: &HeaderMap, last_modified: SystemTime) -> Response {
    let repr = asset.representation(accepts_gzip(request));

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, asset.content_type().clone());
    headers.insert(VARY, HeaderValue::from_static("accept-encoding"));
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.typed_insert(repr.etag.clone());
    headers.typed_insert(LastModified::from(last_modified));
    if let Some(encoding) = repr.encoding {
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
    }

    if is_not_modified(request, repr.etag, last_modified) {
        return (StatusCode::NOT_MODIFIED, headers).into_response();
    }

    let len = repr.body.len() as u64;
    let range = request
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .filter(|_| range_applies(request, repr.etag, last_modified))
        .map_or(ByteRange::Full, |v| range::resolve(v, len));

    match range {
        ByteRange::Full => (StatusCode::OK, headers, repr.body.clone()).into_response(),
        ByteRange::Partial { start, end } => {
            headers.insert(CONTENT_RANGE, content_range(&format!("bytes {start}-{end}/{len}")));
            // start <= end < len, both fit in usize
            let body = repr.body.slice(start as usize..=end as usize);
            (StatusCode::PARTIAL_CONTENT, headers, body).into_response()
        }
        ByteRange::Unsatisfiable => {
            headers.insert(CONTENT_RANGE, content_range(&format!("bytes */{len}")));
            (StatusCode::RANGE_NOT_SATISFIABLE, headers).into_response()
        }
    }
}

fn content_range(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("bytes */0"))
}
