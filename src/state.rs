//! Application context built once at startup and cloned into every handler.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::payment::PaymentProcessor;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenIssuer>,
    /// Unset when no processor is configured; the payment endpoint then answers 503.
    pub payments: Option<Arc<dyn PaymentProcessor>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenIssuer) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            payments: None,
        }
    }

    pub fn with_payments(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.payments = Some(processor);
        self
    }
}
