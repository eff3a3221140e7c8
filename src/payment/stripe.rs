//! Stripe PaymentIntents over the REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{PaymentError, PaymentIntent, PaymentProcessor};

pub struct StripeProcessor {
    client: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
}

#[derive(Deserialize)]
struct IntentBody {
    id: String,
    client_secret: String,
}

impl StripeProcessor {
    pub fn new(
        secret_key: SecretString,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    fn classify(e: reqwest::Error) -> PaymentError {
        if e.is_timeout() {
            PaymentError::Timeout
        } else {
            PaymentError::Transport(e.to_string())
        }
    }
}

/// Turn a Stripe response into an intent, or into the error message Stripe sent back.
fn parse_intent_response(status: StatusCode, body: Value) -> Result<PaymentIntent, PaymentError> {
    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| format!("payment processor returned {}", status));
        return Err(PaymentError::Rejected(message));
    }
    let intent: IntentBody =
        serde_json::from_value(body).map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
    Ok(PaymentIntent {
        id: intent.id,
        client_secret: intent.client_secret,
    })
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_intent(&self, amount: i64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(Self::classify)?;
        let status = response.status();
        let body: Value = response.json().await.map_err(Self::classify)?;
        let result = parse_intent_response(status, body);
        match &result {
            Ok(intent) => tracing::debug!(intent_id = %intent.id, "stripe intent created"),
            Err(e) => tracing::warn!(status = %status, error = %e, "stripe rejected intent"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_yields_client_secret() {
        let body = json!({
            "id": "pi_123",
            "object": "payment_intent",
            "client_secret": "pi_123_secret_abc",
            "amount": 1998
        });
        let intent = parse_intent_response(StatusCode::OK, body).unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");
    }

    #[test]
    fn error_carries_processor_message() {
        let body = json!({
            "error": { "type": "invalid_request_error", "message": "Invalid currency: zzz" }
        });
        let err = parse_intent_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err.to_string(), "Invalid currency: zzz");
    }

    #[test]
    fn error_without_message_reports_status() {
        let err = parse_intent_response(StatusCode::BAD_GATEWAY, json!({})).unwrap_err();
        assert!(matches!(err, PaymentError::Rejected(m) if m.contains("502")));
    }

    #[test]
    fn success_missing_secret_is_invalid() {
        let err = parse_intent_response(StatusCode::OK, json!({ "id": "pi_1" })).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidResponse(_)));
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let stripe = StripeProcessor::new(
            SecretString::from("sk_test_x".to_string()),
            "https://api.stripe.com/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(stripe.api_base, "https://api.stripe.com");
    }
}
