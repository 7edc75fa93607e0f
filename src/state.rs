use std::sync::Arc;

use crate::catalog::ProductCatalog;
use crate::config::Config;
use crate::metrics::MetricsHandle;
use crate::services::payments::PaymentService;
use crate::store::user_store::UserStore;
use crate::utils::jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub payments: Arc<dyn PaymentService>,
    pub metrics: MetricsHandle,
    pub jwt_keys: JwtKeys,
    pub config: Arc<Config>,
}
