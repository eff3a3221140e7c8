//! Orders and payment intents.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::AppError;
use crate::extractors::{CurrentUser, Payload};
use crate::models::{Order, Payment};
use crate::response::created;
use crate::service::{ClientSecret, CreateOrder, CreatePaymentIntent, OrderService};
use crate::state::AppState;

/// POST /orders/ (bearer). The order is always placed for the caller.
pub async fn create_order(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Payload(input): Payload<CreateOrder>,
) -> Result<impl IntoResponse, AppError> {
    let order = OrderService::new(state.store.as_ref()).place(&user, input).await?;
    Ok(created(order))
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(OrderService::new(state.store.as_ref()).list().await?))
}

/// POST /create-payment-intent/
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Payload(input): Payload<CreatePaymentIntent>,
) -> Result<Json<ClientSecret>, AppError> {
    let secret = OrderService::new(state.store.as_ref())
        .create_payment_intent(state.payments.as_deref(), input)
        .await?;
    Ok(Json(secret))
}

pub async fn list_payments(State(state): State<AppState>) -> Result<Json<Vec<Payment>>, AppError> {
    Ok(Json(OrderService::new(state.store.as_ref()).list_payments().await?))
}
