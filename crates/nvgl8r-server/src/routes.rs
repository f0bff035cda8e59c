use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path as UrlPath, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Local;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info, warn};

use crate::auth::PasswordHash;
use crate::photos::PhotoStore;
use crate::relay::Relay;

/// Extensions that may be served, from either directory.
const SERVABLE_EXTENSIONS: &[&str] = &["html", "js", "jpg"];

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub password: Arc<PasswordHash>,
    pub photos: Arc<PhotoStore>,
    pub relay: Option<Arc<Relay>>,
    pub static_dir: Arc<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
}

// ── Path helpers ────────────────────────────────────────────────────────

/// Join `rel` onto `base` and fold `.`/`..` lexically, without touching the FS.
fn resolve(base: &Path, rel: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

fn is_servable(state: &AppState, path: &Path) -> bool {
    let inside = path.starts_with(state.static_dir.as_path()) || path.starts_with(state.photos.dir());
    let allowed_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SERVABLE_EXTENSIONS.iter().any(|ok| ext.eq_ignore_ascii_case(ok)));
    inside && allowed_ext
}

fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("jpg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

async fn serve_file(state: &AppState, path: &Path) -> Response {
    if !is_servable(state, path) {
        warn!("Refusing to serve {}", path.display());
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    match fs::read(path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(path))], bytes).into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

/// GET /photos/{n}.jpg: photo by position, 0 = newest.
pub async fn get_photo(State(state): State<AppState>, UrlPath(rest): UrlPath<String>) -> Response {
    let stem = Path::new(&rest)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let Ok(pos) = stem.parse::<i64>() else {
        return (StatusCode::BAD_REQUEST, "Invalid photo number").into_response();
    };

    match state.photos.get(pos) {
        Ok(Some(path)) => serve_file(&state, &path).await,
        Ok(None) => (StatusCode::NOT_FOUND, "Photo not found").into_response(),
        Err(e) => {
            error!("Photo lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /upload: store the photo locally or forward it to the relay target.
pub async fn upload(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let filename = format!("{}.jpg", Local::now().format("%Y-%m-%d-%H-%M-%S"));

    let result = match &state.relay {
        Some(relay) => {
            let auth = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());
            relay.forward(body, auth).await
        }
        None => store_locally(&state.photos, &filename, &body).await,
    };

    match result {
        Ok(()) => Json(UploadResponse { status: "ok" }).into_response(),
        Err(e) => {
            error!("Failed to handle photo {}: {:#}", filename, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to handle photo: {}", e),
            )
                .into_response()
        }
    }
}

async fn store_locally(photos: &PhotoStore, filename: &str, body: &[u8]) -> anyhow::Result<()> {
    let path = photos.path_for(filename);
    info!("Writing to {}", path.display());

    let result: anyhow::Result<()> = async {
        fs::write(&path, body).await?;
        photos.rotate(filename.to_string()).await
    }
    .await;

    if result.is_err() {
        fs::remove_file(&path).await.ok();
    }
    result
}

/// Everything else: static files on GET, 404 for unknown POST endpoints.
pub async fn fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    match method {
        Method::GET | Method::HEAD => {
            let path = resolve(&state.static_dir, uri.path());
            serve_file(&state, &path).await
        }
        Method::POST => (StatusCode::NOT_FOUND, "Endpoint not found").into_response(),
        _ => StatusCode::NOT_IMPLEMENTED.into_response(),
    }
}
