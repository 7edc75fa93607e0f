use std::time::Duration;

use async_trait::async_trait;

use super::{
    CheckoutLineItem, CheckoutMode, CheckoutSession, CreateCheckoutSessionRequest, PaymentService,
    PaymentServiceError, WebhookEvent,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct LiveStripeService {
    client: stripe::Client,
    webhook_secret: String,
    request_timeout: Duration,
}

impl LiveStripeService {
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        let client = stripe::Client::new(secret_key);
        Self {
            client,
            webhook_secret: webhook_secret.into(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

fn map_mode(mode: CheckoutMode) -> stripe::CheckoutSessionMode {
    match mode {
        CheckoutMode::Payment => stripe::CheckoutSessionMode::Payment,
        CheckoutMode::Subscription => stripe::CheckoutSessionMode::Subscription,
    }
}

fn map_line_items(items: &[CheckoutLineItem]) -> Vec<stripe::CreateCheckoutSessionLineItems> {
    items
        .iter()
        .map(|li| stripe::CreateCheckoutSessionLineItems {
            price: Some(li.price.clone()),
            quantity: Some(li.quantity),
            ..Default::default()
        })
        .collect()
}

#[async_trait]
impl PaymentService for LiveStripeService {
    async fn create_checkout_session(
        &self,
        req: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentServiceError> {
        let mut params = stripe::CreateCheckoutSession::new();
        params.mode = Some(map_mode(req.mode));
        params.success_url = Some(&req.success_url);
        params.cancel_url = Some(&req.cancel_url);
        params.customer_email = Some(&req.customer_email);
        params.allow_promotion_codes = Some(req.allow_promotion_codes);
        if !req.line_items.is_empty() {
            params.line_items = Some(map_line_items(&req.line_items));
        }

        let create = stripe::CheckoutSession::create(&self.client, params);
        let session = match tokio::time::timeout(self.request_timeout, create).await {
            Ok(result) => result?,
            Err(_) => return Err(PaymentServiceError::Timeout),
        };

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url: session.url.clone(),
        })
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, PaymentServiceError> {
        let payload_str =
            std::str::from_utf8(payload).map_err(|e| PaymentServiceError::Serde(e.to_string()))?;
        let event =
            stripe::Webhook::construct_event(payload_str, signature_header, &self.webhook_secret)?;
        let payload =
            serde_json::to_value(&event).map_err(|e| PaymentServiceError::Serde(e.to_string()))?;
        Ok(WebhookEvent {
            id: event.id.to_string(),
            r#type: event.type_.to_string(),
            payload,
        })
    }
}
