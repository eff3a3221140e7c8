//! Resource routes. Paths keep their trailing slashes; `/token` has none.

use crate::handlers::{accounts, catalog, orders, users};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(accounts::register))
        .route("/token", post(accounts::token))
        .route("/users/", get(users::list_users).post(users::create_user))
        .route(
            "/restaurants/",
            get(catalog::list_restaurants).post(catalog::create_restaurant),
        )
        .route(
            "/food_items/",
            get(catalog::list_food_items).post(catalog::create_food_item),
        )
        .route("/orders/", get(orders::list_orders).post(orders::create_order))
        .route("/create-payment-intent/", post(orders::create_payment_intent))
        .route("/payments/", get(orders::list_payments))
}
