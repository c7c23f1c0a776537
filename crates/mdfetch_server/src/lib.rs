//! HTTP front end for the md-fetch engine.
//!
//! `POST /fetch` runs one batch per request; `GET /openapi.yaml` describes
//! the API.

mod routes;

use std::net::SocketAddr;

use anyhow::Context;
use mdfetch_logging::mdfetch_info;

pub use routes::{router, AppState, FetchRequest, OPENAPI_YAML};

/// Binds `addr` and serves the API until the listener fails.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr()?;
    mdfetch_info!("Server listening on http://{}", local);
    println!("Server listening on http://{local}");

    axum::serve(listener, router(state))
        .await
        .context("server terminated")?;
    Ok(())
}
