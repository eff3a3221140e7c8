//! In-process store with the same constraint semantics as PostgreSQL.
//! Backs the router tests and local runs without a database.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Store, StoreError, EMAIL_TAKEN};
use crate::models::{
    FoodItem, NewFoodItem, NewOrder, NewPayment, NewRestaurant, NewUser, Order, Payment,
    PaymentStatus, Restaurant, User, UserRecord,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    restaurants: Vec<Restaurant>,
    food_items: Vec<FoodItem>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
}

/// Rows are append-only, so an id is its position plus one.
fn next_id<T>(rows: &[T]) -> i64 {
    rows.len() as i64 + 1
}

/// One write lock per insert makes the check-then-insert atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|r| r.user.email == user.email) {
            return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
        }
        let created = User {
            id: next_id(&tables.users),
            name: user.name,
            email: user.email,
            address: user.address,
        };
        tables.users.push(UserRecord {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        Ok(created)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|r| r.user.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().map(|r| r.user.clone()).collect())
    }

    async fn create_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, StoreError> {
        let mut tables = self.tables.write().await;
        let created = Restaurant {
            id: next_id(&tables.restaurants),
            name: restaurant.name,
            address: restaurant.address,
        };
        tables.restaurants.push(created.clone());
        Ok(created)
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        Ok(self.tables.read().await.restaurants.clone())
    }

    async fn restaurant_exists(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.restaurants.iter().any(|r| r.id == id))
    }

    async fn create_food_item(&self, item: NewFoodItem) -> Result<FoodItem, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.restaurants.iter().any(|r| r.id == item.restaurant_id) {
            return Err(StoreError::MissingReference {
                kind: "restaurant",
                id: item.restaurant_id,
            });
        }
        let created = FoodItem {
            id: next_id(&tables.food_items),
            name: item.name,
            price: item.price,
            restaurant_id: item.restaurant_id,
        };
        tables.food_items.push(created.clone());
        Ok(created)
    }

    async fn list_food_items(&self) -> Result<Vec<FoodItem>, StoreError> {
        Ok(self.tables.read().await.food_items.clone())
    }

    async fn food_item_exists(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.food_items.iter().any(|f| f.id == id))
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|r| r.user.id == order.user_id) {
            return Err(StoreError::MissingReference {
                kind: "user",
                id: order.user_id,
            });
        }
        if !tables.food_items.iter().any(|f| f.id == order.food_item_id) {
            return Err(StoreError::MissingReference {
                kind: "food item",
                id: order.food_item_id,
            });
        }
        let created = Order {
            id: next_id(&tables.orders),
            user_id: order.user_id,
            food_item_id: order.food_item_id,
            quantity: order.quantity,
            order_time: Utc::now(),
        };
        tables.orders.push(created.clone());
        Ok(created)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.tables.read().await.orders.clone())
    }

    async fn order_exists(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.orders.iter().any(|o| o.id == id))
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.orders.iter().any(|o| o.id == payment.order_id) {
            return Err(StoreError::MissingReference {
                kind: "order",
                id: payment.order_id,
            });
        }
        if tables.payments.iter().any(|p| p.intent_id == payment.intent_id) {
            return Err(StoreError::Conflict(format!(
                "payment intent {} already recorded",
                payment.intent_id
            )));
        }
        let created = Payment {
            id: next_id(&tables.payments),
            order_id: payment.order_id,
            intent_id: payment.intent_id,
            amount: payment.amount,
            currency: payment.currency,
            status: PaymentStatus::Created,
            created_at: Utc::now(),
        };
        tables.payments.push(created.clone());
        Ok(created)
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, StoreError> {
        Ok(self.tables.read().await.payments.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use rust_decimal::Decimal;

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            name: "Alice".into(),
            email: email.into(),
            password_hash: hash_password(password).unwrap(),
            address: "1 Main St".into(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_keeps_first_hash() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice@example.com", "pw123")).await.unwrap();
        let before = store.user_by_email("alice@example.com").await.unwrap().unwrap();

        let err = store
            .create_user(new_user("alice@example.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m == EMAIL_TAKEN));

        let after = store.user_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(before.password_hash, after.password_hash);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn food_item_requires_existing_restaurant() {
        let store = MemoryStore::new();
        let err = store
            .create_food_item(NewFoodItem {
                name: "Margherita".into(),
                price: Decimal::new(999, 2),
                restaurant_id: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { kind: "restaurant", id: 7 }));
        assert!(store.list_food_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_are_sequential_per_table() {
        let store = MemoryStore::new();
        for name in ["A", "B", "C"] {
            store
                .create_restaurant(NewRestaurant {
                    name: name.into(),
                    address: "x".into(),
                })
                .await
                .unwrap();
        }
        let ids: Vec<i64> = store
            .list_restaurants()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn order_requires_existing_food_item() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice@example.com", "pw")).await.unwrap();
        let err = store
            .create_order(NewOrder {
                user_id: user.id,
                food_item_id: 99,
                quantity: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { kind: "food item", id: 99 }));
    }

    #[tokio::test]
    async fn payment_requires_existing_order() {
        let store = MemoryStore::new();
        let err = store
            .create_payment(NewPayment {
                order_id: 1,
                intent_id: "pi_1".into(),
                amount: 1998,
                currency: "usd".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { kind: "order", id: 1 }));
    }
}
