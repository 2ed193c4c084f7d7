//! Bounded-concurrency detail fetcher.
//!
//! Every handle gets its own retrieval future, wrapped in its own timeout.
//! The batch is joined with wait-for-all semantics: a failed or timed-out
//! item settles to `image: None` and never disturbs its siblings.

use std::time::Instant;

use futures_util::StreamExt;
use futures_util::future::join_all;
use futures_util::stream;
use randex_types::{DiagnosticEvent, DiagnosticSink, EnrichedItem, ReferenceHandle};
use serde_json::Value;

use crate::error::FetchError;
use crate::http;
use crate::options::FetchOptions;

/// Loading placeholders for `handles`, in input order. No IO.
#[must_use]
pub fn placeholders(handles: &[ReferenceHandle]) -> Vec<EnrichedItem> {
    handles.iter().map(EnrichedItem::placeholder).collect()
}

/// Fetch the display attribute for every handle.
///
/// Returns exactly one settled item per handle, in input order. Never fails:
/// each per-item failure is recorded in `sink` and degrades that item only.
/// Resolves once every item has settled, so the batch takes roughly as long
/// as its slowest item (bounded by `options.timeout` per admission wave).
pub async fn fetch_details(
    client: &reqwest::Client,
    handles: &[ReferenceHandle],
    options: &FetchOptions,
    sink: &dyn DiagnosticSink,
) -> Vec<EnrichedItem> {
    if handles.is_empty() {
        return Vec::new();
    }

    let started = Instant::now();
    tracing::debug!(
        count = handles.len(),
        timeout_ms = options.timeout.as_millis() as u64,
        concurrency = ?options.concurrency,
        "Fetching item details"
    );

    let attempts = handles
        .iter()
        .map(|handle| settle(client, handle, options, sink));

    // Both joins keep input order regardless of completion order.
    let items: Vec<EnrichedItem> = match options.concurrency {
        None => join_all(attempts).await,
        Some(limit) => stream::iter(attempts).buffered(limit.get()).collect().await,
    };

    tracing::debug!(
        count = items.len(),
        degraded = items.iter().filter(|item| item.is_degraded()).count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Item details settled"
    );

    items
}

/// Run one retrieval to completion, converting any failure into a diagnostic.
///
/// The timer starts on first poll, which under a concurrency cap is the
/// moment the item is admitted rather than the moment the batch started.
async fn settle(
    client: &reqwest::Client,
    handle: &ReferenceHandle,
    options: &FetchOptions,
    sink: &dyn DiagnosticSink,
) -> EnrichedItem {
    let started = Instant::now();
    let retrieval = retrieve(client, handle.url(), &options.display_pointer);

    let outcome = match tokio::time::timeout(options.timeout, retrieval).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(options.timeout)),
    };

    match outcome {
        Ok(image) => EnrichedItem::resolved(handle, image),
        Err(err) => {
            sink.record(DiagnosticEvent {
                name: handle.name().to_string(),
                url: handle.url().to_string(),
                kind: err.kind(),
                message: err.full_message(),
                elapsed: started.elapsed(),
            });
            EnrichedItem::degraded(handle)
        }
    }
}

async fn retrieve(
    client: &reqwest::Client,
    url: &str,
    display_pointer: &str,
) -> Result<String, FetchError> {
    let record = http::get_json(client, url).await?;
    display_field(&record, display_pointer).ok_or_else(|| FetchError::MissingDisplayField {
        pointer: display_pointer.to_string(),
    })
}

/// Non-empty string at `pointer`, if any. `null` counts as absent.
fn display_field(record: &Value, pointer: &str) -> Option<String> {
    record
        .pointer(pointer)?
        .as_str()
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}
