#![allow(dead_code)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::{
    CheckoutSession, CreateCheckoutSessionRequest, PaymentService, PaymentServiceError,
    WebhookEvent,
};

#[derive(Clone, Default)]
pub struct MockPaymentService {
    pub created_sessions: Arc<Mutex<Vec<CheckoutSession>>>,
    pub last_create_requests: Arc<Mutex<Vec<CreateCheckoutSessionRequest>>>,
    pub fail_checkout: Arc<AtomicBool>,
    pub reject_webhooks: Arc<AtomicBool>,
}

impl MockPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_checkout(self) -> Self {
        self.fail_checkout.store(true, Ordering::SeqCst);
        self
    }

    pub fn rejecting_webhooks(self) -> Self {
        self.reject_webhooks.store(true, Ordering::SeqCst);
        self
    }
}

fn make_id(prefix: &str) -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{}_{}", prefix, ts)
}

#[async_trait]
impl PaymentService for MockPaymentService {
    async fn create_checkout_session(
        &self,
        req: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentServiceError> {
        self.last_create_requests.lock().unwrap().push(req);

        if self.fail_checkout.load(Ordering::SeqCst) {
            return Err(PaymentServiceError::Provider(
                "mock provider rejected the request".into(),
            ));
        }

        let session = CheckoutSession {
            id: make_id("cs_test"),
            url: Some("https://example.test/checkout".into()),
        };
        self.created_sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        _signature_header: &str,
    ) -> Result<WebhookEvent, PaymentServiceError> {
        if self.reject_webhooks.load(Ordering::SeqCst) {
            return Err(PaymentServiceError::Webhook("invalid signature".into()));
        }

        let val: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentServiceError::Serde(e.to_string()))?;
        let id = match val.get("id").and_then(|v| v.as_str()) {
            Some(s) => s.to_string(),
            None => make_id("evt"),
        };
        let ty = val
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(WebhookEvent {
            id,
            r#type: ty,
            payload: val,
        })
    }
}
