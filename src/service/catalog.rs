//! Restaurants and their menus.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{FoodItem, NewFoodItem, NewRestaurant, Restaurant};
use crate::service::validation;
use crate::store::Store;

#[derive(Clone, Debug, Deserialize)]
pub struct CreateRestaurant {
    pub name: String,
    pub address: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateFoodItem {
    pub name: String,
    pub price: Decimal,
    pub restaurant_id: i64,
}

pub struct CatalogService<'a> {
    store: &'a dyn Store,
}

impl<'a> CatalogService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    pub async fn create_restaurant(&self, input: CreateRestaurant) -> Result<Restaurant, AppError> {
        let restaurant = NewRestaurant {
            name: validation::required_text("name", &input.name, validation::NAME_MAX)?,
            address: validation::required_text("address", &input.address, validation::ADDRESS_MAX)?,
        };
        let created = self.store.create_restaurant(restaurant).await?;
        tracing::info!(restaurant_id = created.id, "restaurant created");
        Ok(created)
    }

    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, AppError> {
        Ok(self.store.list_restaurants().await?)
    }

    /// The restaurant must already exist; nothing is written otherwise.
    pub async fn create_food_item(&self, input: CreateFoodItem) -> Result<FoodItem, AppError> {
        let name = validation::required_text("name", &input.name, validation::NAME_MAX)?;
        let price = validation::price("price", input.price)?;
        if !self.store.restaurant_exists(input.restaurant_id).await? {
            return Err(AppError::NotFound(format!(
                "restaurant {} does not exist",
                input.restaurant_id
            )));
        }
        let created = self
            .store
            .create_food_item(NewFoodItem {
                name,
                price,
                restaurant_id: input.restaurant_id,
            })
            .await?;
        tracing::info!(food_item_id = created.id, restaurant_id = created.restaurant_id, "food item created");
        Ok(created)
    }

    pub async fn list_food_items(&self) -> Result<Vec<FoodItem>, AppError> {
        Ok(self.store.list_food_items().await?)
    }
}
