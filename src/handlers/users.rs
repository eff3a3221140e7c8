//! User creation and listing.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::AppError;
use crate::extractors::Payload;
use crate::models::User;
use crate::response::created;
use crate::service::{AccountService, RegisterUser};
use crate::state::AppState;

/// POST /users/. Same rules as registration, but answers with the created user.
pub async fn create_user(
    State(state): State<AppState>,
    Payload(input): Payload<RegisterUser>,
) -> Result<impl IntoResponse, AppError> {
    let user = AccountService::new(&state).register(input).await?;
    Ok(created(user))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.store.list_users().await?))
}
