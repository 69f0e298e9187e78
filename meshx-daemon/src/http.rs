//! Page server
//!
//! Serves rendered pages read-only from the render directory:
//! `/` maps to the summary page, any other path to `<path>.html`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

/// Create the HTTP router
pub fn create_router(render_dir: PathBuf) -> Router {
    Router::new()
        .fallback(serve_page)
        .with_state(Arc::new(render_dir))
        .layer(TraceLayer::new_for_http())
}

/// Map a request path to a page file, refusing anything that could leave the render directory
pub fn page_file(render_dir: &Path, request_path: &str) -> Option<PathBuf> {
    if request_path.contains("..") || request_path.contains('\\') || request_path.contains('\0') {
        return None;
    }

    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return Some(render_dir.join("summary.html"));
    }
    Some(render_dir.join(format!("{}.html", relative)))
}

/// Any GET - read the mapped page
async fn serve_page(State(render_dir): State<Arc<PathBuf>>, uri: Uri) -> Response {
    let Some(path) = page_file(&render_dir, uri.path()) else {
        return (StatusCode::BAD_REQUEST, "invalid path").into_response();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response(),
        Err(e) => {
            tracing::debug!("No page at {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

/// Start the HTTP server; returns once shutdown is signalled
pub async fn run_server(
    render_dir: PathBuf,
    addr: SocketAddr,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let router = create_router(render_dir);

    tracing::info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    Ok(())
}
