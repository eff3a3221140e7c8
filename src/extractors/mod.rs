//! Request extractors.

pub mod current_user;
pub mod payload;

pub use current_user::CurrentUser;
pub use payload::Payload;
