//! Registration and token issue.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Form, Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::Payload;
use crate::response::message;
use crate::service::{AccessToken, AccountService, RegisterUser};
use crate::state::AppState;

/// OAuth2 password-grant style form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
}

/// POST /register/
pub async fn register(
    State(state): State<AppState>,
    Payload(input): Payload<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    AccountService::new(&state).register(input).await?;
    Ok(message(StatusCode::CREATED, "User registered successfully"))
}

/// POST /token
pub async fn token(
    State(state): State<AppState>,
    form: Result<Form<TokenForm>, FormRejection>,
) -> Result<Json<AccessToken>, AppError> {
    let Form(form) = form?;
    let token = AccountService::new(&state)
        .login(&form.username, &form.password)
        .await?;
    Ok(Json(token))
}
