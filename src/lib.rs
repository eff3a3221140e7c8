//! Food delivery backend: accounts, restaurants, menus, orders and payment
//! intents over PostgreSQL, served with axum.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod payment;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use routes::{app, cors_layer};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};
