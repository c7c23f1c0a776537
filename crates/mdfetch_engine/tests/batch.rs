use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mdfetch_engine::{
    fetch_batch, fetch_batch_with, EngineConfig, ExecutableLocator, FetchError, FetchTarget,
    Pipeline, RawContent, Retriever,
};
use pretty_assertions::assert_eq;

struct NothingInstalled;

impl ExecutableLocator for NothingInstalled {
    fn find(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}

/// Serves canned bodies keyed on the host; hosts starting with `fail` error.
#[derive(Default)]
struct ScriptedRetriever {
    calls: AtomicUsize,
}

#[async_trait]
impl Retriever for ScriptedRetriever {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn retrieve(&self, target: &FetchTarget) -> Result<RawContent, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let host = target.url().host_str().unwrap_or_default().to_string();
        // Stagger completion so results arrive out of submission order.
        let delay = if host.starts_with('a') { 30 } else { 1 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if host.starts_with("fail") {
            return Err(FetchError::FetchFailed(format!("{host} refused")));
        }
        Ok(RawContent::new(target.as_str(), format!("text from {host}")))
    }
}

fn pipeline() -> Arc<Pipeline> {
    Arc::new(Pipeline::from_config_with_locator(
        &EngineConfig::default(),
        Arc::new(NothingInstalled),
    ))
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn keys(response: &mdfetch_engine::BatchResponse) -> (BTreeSet<&str>, BTreeSet<&str>) {
    (
        response.results.keys().map(String::as_str).collect(),
        response.errors.keys().map(String::as_str).collect(),
    )
}

#[tokio::test]
async fn empty_batch_returns_empty_response() {
    let response = fetch_batch(pipeline(), Vec::new(), None).await;
    assert!(response.is_empty());
    assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"results":{}}"#);
}

#[tokio::test]
async fn every_target_lands_in_exactly_one_map() {
    let retriever = Arc::new(ScriptedRetriever::default());
    let targets = urls(&["alpha.test", "beta.test", "fail.test", "ftp://gamma.test/"]);

    let response = fetch_batch_with(
        pipeline(),
        targets.clone(),
        Ok(retriever.clone() as Arc<dyn Retriever>),
    )
    .await;

    let (ok, failed) = keys(&response);
    assert_eq!(ok, BTreeSet::from(["alpha.test", "beta.test"]));
    assert_eq!(failed, BTreeSet::from(["fail.test", "ftp://gamma.test/"]));
    assert_eq!(response.len(), targets.len());

    assert_eq!(response.results["alpha.test"], "text from alpha.test");
    assert_eq!(
        response.errors["fail.test"],
        "failed to fetch content: fail.test refused"
    );
    assert!(response.errors["ftp://gamma.test/"].starts_with("invalid URL"));

    // The malformed target never reached the backend.
    assert_eq!(retriever.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn resolution_failure_is_reported_per_target() {
    let response = fetch_batch(
        pipeline(),
        urls(&["one.test", "two.test", "not a url"]),
        Some("netscape".to_string()),
    )
    .await;

    assert!(response.results.is_empty());
    assert_eq!(response.errors.len(), 3);
    assert_eq!(response.errors["one.test"], "unsupported browser type: netscape");
    assert_eq!(response.errors["two.test"], "unsupported browser type: netscape");
    assert!(response.errors["not a url"].starts_with("invalid URL"));
}

#[tokio::test]
async fn missing_default_browsers_fail_each_target() {
    let response = fetch_batch(pipeline(), urls(&["one.test"]), None).await;
    assert!(response.errors["one.test"].starts_with("no supported browsers found"));
}

#[tokio::test]
async fn duplicate_targets_collapse_to_one_entry() {
    let retriever: Arc<dyn Retriever> = Arc::new(ScriptedRetriever::default());
    let response = fetch_batch_with(
        pipeline(),
        urls(&["beta.test", "beta.test"]),
        Ok(retriever),
    )
    .await;

    assert_eq!(response.len(), 1);
    assert_eq!(response.results["beta.test"], "text from beta.test");
}

#[tokio::test]
async fn response_serializes_errors_only_when_present() {
    let retriever: Arc<dyn Retriever> = Arc::new(ScriptedRetriever::default());
    let response = fetch_batch_with(pipeline(), urls(&["beta.test"]), Ok(retriever.clone())).await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({ "results": { "beta.test": "text from beta.test" } })
    );

    let response = fetch_batch_with(pipeline(), urls(&["fail.test"]), Ok(retriever)).await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({
            "results": {},
            "errors": { "fail.test": "failed to fetch content: fail.test refused" }
        })
    );
}
