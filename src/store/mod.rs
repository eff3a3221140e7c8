//! Persistence: the `Store` trait plus PostgreSQL and in-memory backends.
//!
//! Every method is its own unit of work. Backends must enforce the same
//! constraints: unique user email, and that referenced rows exist at insert time.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    FoodItem, NewFoodItem, NewOrder, NewPayment, NewRestaurant, NewUser, Order, Payment,
    Restaurant, User, UserRecord,
};

pub const EMAIL_TAKEN: &str = "Email already registered";

#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint violated.
    #[error("{0}")]
    Conflict(String),
    /// A foreign key pointed at a row that does not exist.
    #[error("{kind} {id} does not exist")]
    MissingReference { kind: &'static str, id: i64 },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn create_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, StoreError>;
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError>;
    async fn restaurant_exists(&self, id: i64) -> Result<bool, StoreError>;

    /// Fails with `MissingReference` when the restaurant does not exist.
    async fn create_food_item(&self, item: NewFoodItem) -> Result<FoodItem, StoreError>;
    async fn list_food_items(&self) -> Result<Vec<FoodItem>, StoreError>;
    async fn food_item_exists(&self, id: i64) -> Result<bool, StoreError>;

    /// Fails with `MissingReference` when the user or food item does not exist.
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn order_exists(&self, id: i64) -> Result<bool, StoreError>;

    /// Fails with `MissingReference` when the order does not exist.
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError>;
    async fn list_payments(&self) -> Result<Vec<Payment>, StoreError>;
}
