use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mdfetch_engine::{fetch_batch, Pipeline};
use mdfetch_logging::{mdfetch_info, mdfetch_warn};
use serde::{Deserialize, Deserializer};

pub const OPENAPI_YAML: &str = include_str!("openapi.yaml");

/// Shared by every request; the pipeline is immutable once built.
#[derive(Debug, Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }
}

/// Body of `POST /fetch`. A missing or null `urls` field is an empty batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FetchRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub urls: Vec<String>,
    #[serde(default)]
    pub browser: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/fetch", post(handle_fetch))
        .route("/openapi.yaml", get(handle_openapi))
        .with_state(state)
}

// The body is parsed by hand so that any malformed payload, whatever its
// content type, gets the same 400 response.
async fn handle_fetch(State(state): State<AppState>, body: Bytes) -> Response {
    let request: FetchRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            mdfetch_warn!("rejected /fetch body: {}", err);
            return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
        }
    };

    mdfetch_info!(
        "POST /fetch urls={} browser={}",
        request.urls.len(),
        request.browser.as_deref().unwrap_or("default")
    );
    let response = fetch_batch(state.pipeline.clone(), request.urls, request.browser).await;
    Json(response).into_response()
}

async fn handle_openapi() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/yaml")], OPENAPI_YAML)
}
