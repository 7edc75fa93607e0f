// NOTE: async-stripe is compiled with a minimal feature set (runtime-tokio-hyper,
// checkout, webhook-events, and connect to satisfy webhook payload types).
// Touching APIs outside those features requires updating Cargo.toml explicitly
// so compile times and binary size stay in check.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PaymentServiceError {
    #[error("payment provider error: {0}")]
    Provider(String),
    #[error("webhook verification failed: {0}")]
    Webhook(String),
    #[error("payment provider request timed out")]
    Timeout,
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<stripe::StripeError> for PaymentServiceError {
    fn from(err: stripe::StripeError) -> Self {
        PaymentServiceError::Provider(err.to_string())
    }
}

impl From<stripe::WebhookError> for PaymentServiceError {
    fn from(err: stripe::WebhookError) -> Self {
        PaymentServiceError::Webhook(err.to_string())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    Payment,
    Subscription,
}

impl CheckoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub price: String,
    pub quantity: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    pub success_url: String,
    pub cancel_url: String,
    pub mode: CheckoutMode,
    pub line_items: Vec<CheckoutLineItem>,
    pub customer_email: String,
    pub allow_promotion_codes: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// A signature-verified provider event: the kind string plus the raw payload
/// for the ingester to interpret.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    pub r#type: String,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_checkout_session(
        &self,
        req: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentServiceError>;

    /// Verifies `signature_header` against the exact raw request bytes. Must
    /// run before any body parsing touches the payload.
    fn verify_webhook(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, PaymentServiceError>;
}

mod live;
mod mock;

pub use live::LiveStripeService;
pub use mock::MockPaymentService;
