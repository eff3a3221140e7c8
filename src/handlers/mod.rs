//! HTTP handlers. Each one extracts input, calls a service and shapes the response.

pub mod accounts;
pub mod catalog;
pub mod orders;
pub mod users;
