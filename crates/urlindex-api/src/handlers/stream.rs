use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use urlindex::BatchEvent;

use crate::{
    error::ApiResult,
    routes::index::IndexRequest,
    state::AppState,
};

pub const STREAM_FAILED: &str = "Stream processing failed";

/// Submit a batch and stream each outcome as it completes using Server-Sent Events
///
/// Frames, in order: `start`, one `result` per URL, `summary`, `complete`.
/// If the pipeline breaks, a single `error` frame ends the stream instead.
#[utoipa::path(
    post,
    path = "/api/index/stream",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "Streaming response", content_type = "text/event-stream"),
        (status = 400, description = "No usable URLs in the request",
            body = crate::routes::index::ErrorResponse)
    ),
    tag = "indexing"
)]
pub async fn index_urls_stream(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IndexRequest>, JsonRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let (urls, notification_type) = IndexRequest::parse(payload)?;

    tracing::info!(count = urls.len(), "Received streaming indexing request");

    // Dropping the SSE body drops the receiver, which stops the batch
    let events = state.processor_for(notification_type).spawn_run(urls);

    Ok(Sse::new(sse_stream(events)).keep_alive(KeepAlive::default()))
}

/// Convert batch events to SSE frames
pub fn sse_stream(
    mut events: mpsc::Receiver<BatchEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        loop {
            let next = match events.recv().await {
                Some(BatchEvent::Started { total, .. }) => {
                    frame("start", &json!({
                        "message": format!("Starting to process {} URLs", total)
                    }))
                }
                Some(BatchEvent::Outcome(outcome)) => frame("result", &outcome),
                Some(BatchEvent::Summary(summary)) => {
                    match frame("summary", &summary) {
                        Some(summary) => {
                            yield Ok(summary);
                            yield Ok(complete_event());
                        }
                        None => yield Ok(error_event()),
                    }
                    break;
                }
                Some(BatchEvent::Error { message }) => {
                    tracing::error!(error = %message, "Batch pipeline failed");
                    yield Ok(error_event());
                    break;
                }
                None => {
                    tracing::error!("Batch ended without a summary");
                    yield Ok(error_event());
                    break;
                }
            };

            match next {
                Some(event) => yield Ok(event),
                None => {
                    yield Ok(error_event());
                    break;
                }
            }
        }
    }
}

fn frame<T: Serialize>(name: &str, data: &T) -> Option<Event> {
    match Event::default().event(name).json_data(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(event = name, error = %e, "Failed to serialize stream event");
            None
        }
    }
}

fn complete_event() -> Event {
    Event::default()
        .event("complete")
        .data(r#"{"message":"All URLs processed"}"#)
}

fn error_event() -> Event {
    Event::default()
        .event("error")
        .data(format!(r#"{{"error":"{}"}}"#, STREAM_FAILED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use serde_json::Value;
    use urlindex::{BatchSummary, SubmissionOutcome};

    /// Feed the events through a closed channel and decode the SSE body
    async fn frames(events: Vec<BatchEvent>) -> Vec<(String, Value)> {
        let (tx, rx) = mpsc::channel(16);
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let response = Sse::new(sse_stream(rx)).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();

        body.split("\n\n")
            .filter_map(|block| {
                let mut name = None;
                let mut data: Option<Value> = None;
                for line in block.lines() {
                    if let Some(rest) = line.strip_prefix("event:") {
                        name = Some(rest.trim().to_string());
                    } else if let Some(rest) = line.strip_prefix("data:") {
                        data = Some(serde_json::from_str(rest.trim()).unwrap());
                    }
                }
                Some((name?, data?))
            })
            .collect()
    }

    fn names(frames: &[(String, Value)]) -> Vec<&str> {
        frames.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_full_batch_frames() {
        let events = vec![
            BatchEvent::Started { batch_id: "b".into(), total: 1 },
            BatchEvent::Outcome(SubmissionOutcome::failed("https://a.test", "nope")),
            BatchEvent::Summary(BatchSummary { total: 1, successful: 0, failed: 1 }),
        ];

        let frames = frames(events).await;
        assert_eq!(names(&frames), vec!["start", "result", "summary", "complete"]);
        assert_eq!(frames[0].1, json!({"message": "Starting to process 1 URLs"}));
        assert_eq!(
            frames[1].1,
            json!({"url": "https://a.test", "success": false, "error": "nope"})
        );
        assert_eq!(frames[2].1, json!({"total": 1, "successful": 0, "failed": 1}));
        assert_eq!(frames[3].1, json!({"message": "All URLs processed"}));
    }

    #[tokio::test]
    async fn test_closed_channel_ends_with_single_error() {
        let events = vec![
            BatchEvent::Started { batch_id: "b".into(), total: 3 },
            BatchEvent::Outcome(SubmissionOutcome::failed("https://a.test/1", "nope")),
        ];

        let frames = frames(events).await;
        assert_eq!(names(&frames), vec!["start", "result", "error"]);
        assert_eq!(frames[2].1, json!({"error": STREAM_FAILED}));
    }

    #[tokio::test]
    async fn test_pipeline_error_ends_stream() {
        let events = vec![
            BatchEvent::Started { batch_id: "b".into(), total: 3 },
            BatchEvent::Error { message: "boom".into() },
            BatchEvent::Outcome(SubmissionOutcome::failed("https://a.test/1", "late")),
            BatchEvent::Summary(BatchSummary::default()),
        ];

        let frames = frames(events).await;
        assert_eq!(names(&frames), vec!["start", "error"]);
        assert_eq!(frames[1].1, json!({"error": "Stream processing failed"}));
    }

    #[tokio::test]
    async fn test_no_events_is_an_error() {
        let frames = frames(Vec::new()).await;
        assert_eq!(names(&frames), vec!["error"]);
        assert_eq!(frames[0].1, json!({"error": STREAM_FAILED}));
    }
}
