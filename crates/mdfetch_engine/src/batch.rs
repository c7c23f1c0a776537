use std::sync::Arc;
use std::time::Instant;

use mdfetch_logging::{mdfetch_info, mdfetch_warn};
use tokio::sync::mpsc;

use crate::backend::Retriever;
use crate::pipeline::Pipeline;
use crate::{BatchResponse, FetchError, FetchOutcome, FetchTarget};

/// Fetches every target concurrently with one backend resolved for the whole
/// batch. Never fails as a whole: each target ends up in exactly one of
/// `results` or `errors`.
pub async fn fetch_batch(
    pipeline: Arc<Pipeline>,
    targets: Vec<String>,
    preference: Option<String>,
) -> BatchResponse {
    if targets.is_empty() {
        return BatchResponse::default();
    }

    let retriever = pipeline
        .resolve(preference.as_deref())
        .map(|backend| Arc::new(backend) as Arc<dyn Retriever>);
    if let Err(err) = &retriever {
        mdfetch_warn!("batch of {} targets has no backend: {}", targets.len(), err);
    }

    fetch_batch_with(pipeline, targets, retriever).await
}

/// [`fetch_batch`] with the backend already chosen. A resolution error is
/// reported against every target whose URL is otherwise valid.
pub async fn fetch_batch_with(
    pipeline: Arc<Pipeline>,
    targets: Vec<String>,
    retriever: Result<Arc<dyn Retriever>, FetchError>,
) -> BatchResponse {
    let started = Instant::now();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<FetchOutcome>();

    for target in &targets {
        let outcome_tx = outcome_tx.clone();
        let pipeline = pipeline.clone();
        let retriever = retriever.clone();
        let target = target.clone();
        tokio::spawn(async move {
            let result = fetch_one(&pipeline, retriever, &target).await;
            let _ = outcome_tx.send(FetchOutcome { target, result });
        });
    }
    drop(outcome_tx);

    // Sole owner of the aggregate; workers only ever send.
    let mut response = BatchResponse::default();
    while let Some(outcome) = outcome_rx.recv().await {
        response.record(outcome);
    }

    // A worker that panicked dropped its sender without reporting.
    for target in targets {
        if !response.contains(&target) {
            response.record(FetchOutcome {
                target,
                result: Err(FetchError::fetch_failed("fetch task aborted")),
            });
        }
    }

    mdfetch_info!(
        "batch finished: {} ok, {} failed in {:?}",
        response.results.len(),
        response.errors.len(),
        started.elapsed()
    );
    response
}

async fn fetch_one(
    pipeline: &Pipeline,
    retriever: Result<Arc<dyn Retriever>, FetchError>,
    raw: &str,
) -> Result<String, FetchError> {
    let target = FetchTarget::parse(raw)?;
    let retriever = retriever?;
    pipeline
        .fetch_with(retriever.as_ref(), &target)
        .await
        .map(|rendered| rendered.content)
}
