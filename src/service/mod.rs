//! Business operations between the handlers and the store.

pub mod accounts;
pub mod catalog;
pub mod orders;
pub mod validation;

pub use accounts::{AccessToken, AccountService, RegisterUser};
pub use catalog::{CatalogService, CreateFoodItem, CreateRestaurant};
pub use orders::{ClientSecret, CreateOrder, CreatePaymentIntent, OrderService};
