//! Payment bridge: asks an external processor for a payment intent and relays
//! its client secret. Nothing about the intent is stored unless the caller
//! links it to an order.

mod stripe;

pub use stripe::StripeProcessor;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor answered with an error; carries its message.
    #[error("{0}")]
    Rejected(String),
    #[error("payment processor timed out")]
    Timeout,
    #[error("payment processor unreachable: {0}")]
    Transport(String),
    #[error("unexpected payment processor response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// `amount` is in the currency's minor unit (cents for usd).
    async fn create_intent(&self, amount: i64, currency: &str) -> Result<PaymentIntent, PaymentError>;
}
