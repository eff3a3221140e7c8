//! Order placement and the payment intents that may pay for them.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{NewOrder, NewPayment, Order, Payment, User};
use crate::payment::PaymentProcessor;
use crate::service::validation;
use crate::store::Store;

/// Order input. The owner is never taken from here.
#[derive(Clone, Debug, Deserialize)]
pub struct CreateOrder {
    pub food_item_id: i64,
    pub quantity: i32,
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatePaymentIntent {
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// When set, the order must exist and the intent is recorded against it.
    #[serde(default)]
    pub order_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecret {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

pub struct OrderService<'a> {
    store: &'a dyn Store,
}

impl<'a> OrderService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub async fn place(&self, customer: &User, input: CreateOrder) -> Result<Order, AppError> {
        let quantity = validation::positive_i32("quantity", input.quantity)?;
        if !self.store.food_item_exists(input.food_item_id).await? {
            return Err(AppError::NotFound(format!(
                "food item {} does not exist",
                input.food_item_id
            )));
        }
        let order = self
            .store
            .create_order(NewOrder {
                user_id: customer.id,
                food_item_id: input.food_item_id,
                quantity,
            })
            .await?;
        tracing::info!(order_id = order.id, user_id = order.user_id, quantity, "order placed");
        Ok(order)
    }

    pub async fn list(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.store.list_orders().await?)
    }

    /// Ask the processor for an intent. A linked order is checked before the
    /// processor is called and the payment row is written only after it answers.
    pub async fn create_payment_intent(
        &self,
        processor: Option<&dyn PaymentProcessor>,
        input: CreatePaymentIntent,
    ) -> Result<ClientSecret, AppError> {
        let amount = validation::positive_i64("amount", input.amount)?;
        let currency = validation::currency("currency", &input.currency)?;
        let processor = processor.ok_or(AppError::PaymentUnavailable)?;

        if let Some(order_id) = input.order_id {
            if !self.store.order_exists(order_id).await? {
                return Err(AppError::NotFound(format!("order {} does not exist", order_id)));
            }
        }

        let intent = processor.create_intent(amount, &currency).await?;
        tracing::info!(intent_id = %intent.id, amount, currency = %currency, "payment intent created");

        if let Some(order_id) = input.order_id {
            let payment = self
                .store
                .create_payment(NewPayment {
                    order_id,
                    intent_id: intent.id.clone(),
                    amount,
                    currency,
                })
                .await
                .map_err(|e| {
                    tracing::warn!(intent_id = %intent.id, order_id, error = %e, "payment intent created but not recorded");
                    e
                })?;
            tracing::info!(payment_id = payment.id, order_id, "payment recorded");
        }

        Ok(ClientSecret {
            client_secret: intent.client_secret,
        })
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, AppError> {
        Ok(self.store.list_payments().await?)
    }
}
