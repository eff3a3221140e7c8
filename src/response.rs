//! Response helpers shared by handlers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn message(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<MessageBody>) {
    (
        status,
        Json(MessageBody {
            message: message.into(),
        }),
    )
}
