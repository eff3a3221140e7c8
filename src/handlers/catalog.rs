//! Restaurants and food items.

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::AppError;
use crate::extractors::Payload;
use crate::models::{FoodItem, Restaurant};
use crate::response::created;
use crate::service::{CatalogService, CreateFoodItem, CreateRestaurant};
use crate::state::AppState;

pub async fn create_restaurant(
    State(state): State<AppState>,
    Payload(input): Payload<CreateRestaurant>,
) -> Result<impl IntoResponse, AppError> {
    let restaurant = CatalogService::new(state.store.as_ref())
        .create_restaurant(input)
        .await?;
    Ok(created(restaurant))
}

pub async fn list_restaurants(State(state): State<AppState>) -> Result<Json<Vec<Restaurant>>, AppError> {
    let rows = CatalogService::new(state.store.as_ref()).list_restaurants().await?;
    Ok(Json(rows))
}

pub async fn create_food_item(
    State(state): State<AppState>,
    Payload(input): Payload<CreateFoodItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = CatalogService::new(state.store.as_ref())
        .create_food_item(input)
        .await?;
    Ok(created(item))
}

pub async fn list_food_items(State(state): State<AppState>) -> Result<Json<Vec<FoodItem>>, AppError> {
    let rows = CatalogService::new(state.store.as_ref()).list_food_items().await?;
    Ok(Json(rows))
}
