//! Remote transport - a best-effort HTTP sink.
//!
//! The remote store sits behind a single endpoint that may be invoked in a
//! mode yielding no readable response (a cross-origin opaque response). The
//! transport therefore reports a three-valued [`Outcome`] instead of a
//! boolean: `Confirmed` means the remote answered with success, `Unconfirmed`
//! means "dispatched without a network-level error, persistence unknown".
//! Callers must not assume anything stronger than what the channel provides.
//!
//! `send` never errors across the component boundary; every network or
//! protocol problem collapses to `Failed` and is retried through the queue.

use crate::config::SyncConfig;
use async_trait::async_trait;
use serde::Serialize;
use tillsync_engine::{records_from_value, Category, OperationKind, Record, Timestamp};

/// Delivery outcome of one transport attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The remote acknowledged the request with a success status.
    Confirmed,
    /// The request was dispatched but the response was opaque; the remote
    /// may or may not have persisted it.
    Unconfirmed,
    /// The request did not go out, or the remote rejected it.
    Failed,
}

impl Outcome {
    /// Whether the attempt counts as delivered for queue purposes.
    ///
    /// Unconfirmed counts: under an opaque channel it is the strongest
    /// signal available, and re-sending forever would never improve it.
    pub fn delivered(&self) -> bool {
        !matches!(self, Outcome::Failed)
    }
}

/// POST body of a push request.
#[derive(Debug, Serialize)]
struct PushBody<'a> {
    operation: &'static str,
    sheet: &'static str,
    items: &'a [Record],
}

/// The remote sink abstraction the orchestrator and queues talk to.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one operation. Never errors; problems become [`Outcome::Failed`].
    async fn send(&self, category: Category, kind: OperationKind, items: &[Record]) -> Outcome;

    /// Fetch the remote snapshot for a category, scoped by the watermark.
    ///
    /// Best-effort: `None` when the channel is opaque or the request failed.
    /// `None` is "nothing usable came back", not "the category is empty".
    async fn pull(&self, category: Category, last_sync: Option<Timestamp>) -> Option<Vec<Record>>;

    /// Ask the remote to provision the category's sheet. Default: nothing to
    /// do, reported as confirmed.
    async fn init(&self, _category: Category) -> Outcome {
        Outcome::Confirmed
    }
}

/// HTTP implementation over a single endpoint URL.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    opaque: bool,
}

impl HttpTransport {
    /// Transport against `endpoint`; `opaque` marks a channel whose
    /// responses cannot be read.
    pub fn new(endpoint: impl Into<String>, opaque: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            opaque,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.endpoint.clone(), config.opaque)
    }

    async fn get(&self, operation: &str, category: Category, last_sync: Option<Timestamp>) -> Option<reqwest::Response> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[("operation", operation), ("sheet", category.sheet())]);
        if let Some(timestamp) = last_sync {
            request = request.query(&[("lastSync", timestamp.to_string().as_str())]);
        }

        match request.send().await {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!(%category, operation, error = %e, "remote GET failed");
                None
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, category: Category, kind: OperationKind, items: &[Record]) -> Outcome {
        let body = PushBody {
            operation: kind.as_str(),
            sheet: category.sheet(),
            items,
        };
        let body = match serde_json::to_string(&body) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(%category, error = %e, "unserializable push body");
                return Outcome::Failed;
            }
        };

        // text/plain keeps the request "simple" so the browser-shaped remote
        // never sees a CORS preflight.
        let result = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await;

        match result {
            Ok(_) if self.opaque => Outcome::Unconfirmed,
            Ok(response) if response.status().is_success() => Outcome::Confirmed,
            Ok(response) => {
                tracing::warn!(%category, status = %response.status(), "remote rejected push");
                Outcome::Failed
            }
            Err(e) => {
                tracing::warn!(%category, error = %e, "push did not go out");
                Outcome::Failed
            }
        }
    }

    async fn pull(&self, category: Category, last_sync: Option<Timestamp>) -> Option<Vec<Record>> {
        if self.opaque {
            // The body is unreadable by definition; do not even ask.
            return None;
        }

        let response = self.get("get", category, last_sync).await?;
        if !response.status().is_success() {
            tracing::warn!(%category, status = %response.status(), "remote rejected pull");
            return None;
        }

        match response.json::<serde_json::Value>().await {
            Ok(value) => Some(records_from_value(value)),
            Err(e) => {
                tracing::warn!(%category, error = %e, "unreadable pull body");
                None
            }
        }
    }

    async fn init(&self, category: Category) -> Outcome {
        match self.get("init", category, None).await {
            Some(_) if self.opaque => Outcome::Unconfirmed,
            Some(response) if response.status().is_success() => Outcome::Confirmed,
            Some(_) | None => Outcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_is_not_delivered() {
        assert!(Outcome::Confirmed.delivered());
        assert!(Outcome::Unconfirmed.delivered());
        assert!(!Outcome::Failed.delivered());
    }

    #[test]
    fn push_body_wire_shape() {
        let items = records_from_value(json!([{"id": "p1", "timestamp": 100}]));
        let body = PushBody {
            operation: OperationKind::Upsert.as_str(),
            sheet: Category::Products.sheet(),
            items: &items,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            json!({
                "operation": "upsert",
                "sheet": "POS_PRODUCTS_LIST",
                "items": [{"id": "p1", "timestamp": 100}],
            })
        );
    }
}
