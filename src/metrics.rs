use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::payments::WebhookEvent;

/// `recent` keeps the newest entries first and never grows past this.
pub const RECENT_EVENT_CAP: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub revenue: f64,
    pub mrr: f64,
    pub active_subs: u64,
    pub orders: u64,
}

/// Write-once log entry appended to `Metrics::recent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentEntry {
    pub ts: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

/// Process-wide business aggregates. Non-durable by design: zeroed at
/// process start, gone at process stop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub kpis: Kpis,
    pub recent: Vec<RecentEntry>,
}

/// Closed set of provider event kinds the ingester understands. Everything
/// else folds to `Ignored`, which is acknowledged but changes no state.
///
/// Redelivery of the same provider event id is applied again; the counters
/// are demo aggregates and carry no idempotency tracking.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    CheckoutCompleted {
        session_id: String,
        mode: String,
        amount_minor: i64,
        customer_email: Option<String>,
    },
    SubscriptionCreated {
        subscription_id: String,
        mrr_minor: i64,
    },
    SubscriptionDeleted {
        subscription_id: String,
        mrr_minor: i64,
    },
    Ignored,
}

// Small helper: nested json lookup
fn jget<'a>(val: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = val;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

fn extract_str<'a>(val: &'a Value, path: &[&str]) -> Option<&'a str> {
    jget(val, path)?.as_str()
}

fn extract_i64(val: &Value, path: &[&str]) -> Option<i64> {
    jget(val, path)?.as_i64()
}

/// Sum of `items.data[].price.unit_amount` over a subscription payload,
/// in minor units.
fn subscription_mrr_minor(payload: &Value) -> i64 {
    jget(payload, &["data", "object", "items", "data"])
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| extract_i64(item, &["price", "unit_amount"]))
                .sum()
        })
        .unwrap_or(0)
}

impl PaymentEvent {
    pub fn from_webhook(event: &WebhookEvent) -> Self {
        let payload = &event.payload;
        match event.r#type.as_str() {
            "checkout.session.completed" => PaymentEvent::CheckoutCompleted {
                session_id: extract_str(payload, &["data", "object", "id"])
                    .unwrap_or_default()
                    .to_string(),
                mode: extract_str(payload, &["data", "object", "mode"])
                    .unwrap_or_default()
                    .to_string(),
                amount_minor: extract_i64(payload, &["data", "object", "amount_total"])
                    .unwrap_or(0),
                customer_email: extract_str(payload, &["data", "object", "customer_email"])
                    .map(|s| s.to_string()),
            },
            "customer.subscription.created" => PaymentEvent::SubscriptionCreated {
                subscription_id: extract_str(payload, &["data", "object", "id"])
                    .unwrap_or_default()
                    .to_string(),
                mrr_minor: subscription_mrr_minor(payload),
            },
            "customer.subscription.deleted" => PaymentEvent::SubscriptionDeleted {
                subscription_id: extract_str(payload, &["data", "object", "id"])
                    .unwrap_or_default()
                    .to_string(),
                mrr_minor: subscription_mrr_minor(payload),
            },
            _ => PaymentEvent::Ignored,
        }
    }
}

impl Metrics {
    /// Folds one verified event into the aggregates. Runs synchronously with
    /// no suspension point, so a single event's update is atomic.
    pub fn apply(&mut self, event: &PaymentEvent) {
        match event {
            PaymentEvent::CheckoutCompleted {
                session_id,
                mode,
                amount_minor,
                customer_email,
            } => {
                let amount = *amount_minor as f64 / 100.0;
                self.kpis.revenue += amount;
                self.kpis.orders += 1;
                if mode == "subscription" {
                    self.kpis.active_subs += 1;
                }
                self.push_recent(
                    "order",
                    json!({
                        "id": session_id,
                        "mode": mode,
                        "amount": amount,
                        "customer": customer_email,
                    }),
                );
            }
            PaymentEvent::SubscriptionCreated {
                subscription_id,
                mrr_minor,
            } => {
                let mrr = *mrr_minor as f64 / 100.0;
                self.kpis.mrr += mrr;
                self.kpis.active_subs += 1;
                self.push_recent("subscription_created", json!({ "id": subscription_id, "mrr": mrr }));
            }
            PaymentEvent::SubscriptionDeleted {
                subscription_id,
                mrr_minor,
            } => {
                let mrr = *mrr_minor as f64 / 100.0;
                self.kpis.mrr = (self.kpis.mrr - mrr).max(0.0);
                self.kpis.active_subs = self.kpis.active_subs.saturating_sub(1);
                self.push_recent("subscription_canceled", json!({ "id": subscription_id, "mrr": mrr }));
            }
            PaymentEvent::Ignored => {}
        }
    }

    fn push_recent(&mut self, kind: &str, data: Value) {
        self.recent.insert(
            0,
            RecentEntry {
                ts: chrono::Utc::now().to_rfc3339(),
                kind: kind.to_string(),
                data,
            },
        );
        self.recent.truncate(RECENT_EVENT_CAP);
    }
}

/// Explicitly owned handle to the metrics state: constructed once in `main`,
/// handed to the webhook ingester for mutation and to the admin endpoint for
/// read-only snapshots. No ambient global.
#[derive(Clone, Default)]
pub struct MetricsHandle {
    inner: Arc<RwLock<Metrics>>,
}

impl MetricsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: &PaymentEvent) {
        self.inner.write().unwrap().apply(event);
    }

    pub fn snapshot(&self) -> Metrics {
        self.inner.read().unwrap().clone()
    }
}
