//! PostgreSQL backend: table DDL, database bootstrap, and CRUD over a shared pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgConnection, PgPool};
use std::str::FromStr;

use super::{Store, StoreError, EMAIL_TAKEN};
use crate::auth::PasswordHash;
use crate::models::{
    FoodItem, NewFoodItem, NewOrder, NewPayment, NewRestaurant, NewUser, Order, Payment,
    PaymentStatus, Restaurant, User, UserRecord,
};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Tables in dependency order. Each statement is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL,
        password VARCHAR(255) NOT NULL,
        address VARCHAR(255) NOT NULL,
        CONSTRAINT users_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS restaurants (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        address VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS food_items (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
        restaurant_id BIGINT NOT NULL
            CONSTRAINT food_items_restaurant_id_fkey REFERENCES restaurants (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL
            CONSTRAINT orders_user_id_fkey REFERENCES users (id),
        food_item_id BIGINT NOT NULL
            CONSTRAINT orders_food_item_id_fkey REFERENCES food_items (id),
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        order_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id BIGSERIAL PRIMARY KEY,
        order_id BIGINT NOT NULL
            CONSTRAINT payments_order_id_fkey REFERENCES orders (id),
        intent_id TEXT NOT NULL UNIQUE,
        amount BIGINT NOT NULL CHECK (amount > 0),
        currency VARCHAR(3) NOT NULL,
        status TEXT NOT NULL DEFAULT 'created'
            CHECK (status IN ('created', 'succeeded', 'failed')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS food_items_restaurant_id_idx ON food_items (restaurant_id)",
    "CREATE INDEX IF NOT EXISTS orders_user_id_idx ON orders (user_id)",
];

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create all tables, constraints, and indexes if missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for ddl in SCHEMA {
            sqlx::query(logged(ddl)).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        tracing::info!(tables = 5, "database schema ready");
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// server's `postgres` database to run CREATE DATABASE. Call before [`PgStore::connect`].
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let Some((admin_url, db_name)) = split_database_url(database_url) else {
        return Ok(());
    };
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn: PgConnection = opts.connect().await?;
    let exists: bool =
        sqlx::query_scalar(logged("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)"))
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists {
        let create = format!("CREATE DATABASE {}", quote_ident(&db_name));
        sqlx::query(logged(&create))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// Split a connection URL into (url of the `postgres` admin database, target database name).
fn split_database_url(url: &str) -> Option<(String, String)> {
    let scheme_end = url.find("://")? + 3;
    let path_start = scheme_end + url.get(scheme_end..)?.find('/')? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (path_and_query, None),
    };
    let base = url.get(..path_start)?;
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Some((admin_url, db_name.trim().to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Map constraint violations onto store errors. `references` pairs an FK constraint
/// name with the entity kind and id it was checked against.
fn map_write_error(err: sqlx::Error, references: &[(&str, &'static str, i64)]) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                let message = match db_err.constraint() {
                    Some("users_email_key") => EMAIL_TAKEN.to_string(),
                    _ => db_err.message().to_string(),
                };
                return StoreError::Conflict(message);
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                let constraint = db_err.constraint();
                if let Some((_, kind, id)) = references
                    .iter()
                    .find(|(name, _, _)| Some(*name) == constraint)
                {
                    return StoreError::MissingReference { kind: *kind, id: *id };
                }
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

async fn row_exists(conn: &mut PgConnection, table: &str, id: i64) -> Result<bool, StoreError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", quote_ident(table));
    let exists: bool = sqlx::query_scalar(logged(&sql)).bind(id).fetch_one(&mut *conn).await?;
    Ok(exists)
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    address: String,
    password: String,
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    order_id: i64,
    intent_id: String,
    amount: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<PaymentStatus>()
            .map_err(|e| StoreError::Database(sqlx::Error::Decode(e.into())))?;
        Ok(Payment {
            id: row.id,
            order_id: row.order_id,
            intent_id: row.intent_id,
            amount: row.amount,
            currency: row.currency,
            status,
            created_at: row.created_at,
        })
    }
}

const PAYMENT_COLUMNS: &str = "id, order_id, intent_id, amount, currency, status, created_at";

/// Every statement goes through here so SQL shows up at `debug`.
fn logged(sql: &str) -> &str {
    tracing::debug!(sql = %sql, "query");
    sql
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query(logged("SELECT 1")).execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = "INSERT INTO users (name, email, password, address) VALUES ($1, $2, $3, $4) \
                   RETURNING id, name, email, address";
        sqlx::query_as::<_, User>(logged(sql))
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.password_hash.as_str())
            .bind(&user.address)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &[]))
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = "SELECT id, name, email, address, password FROM users WHERE email = $1";
        let row = sqlx::query_as::<_, UserRow>(logged(sql))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| UserRecord {
            user: User {
                id: r.id,
                name: r.name,
                email: r.email,
                address: r.address,
            },
            password_hash: PasswordHash::from_stored(r.password),
        }))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = "SELECT id, name, email, address FROM users ORDER BY id";
        let rows = sqlx::query_as::<_, User>(logged(sql))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create_restaurant(&self, restaurant: NewRestaurant) -> Result<Restaurant, StoreError> {
        let sql = "INSERT INTO restaurants (name, address) VALUES ($1, $2) RETURNING id, name, address";
        let row = sqlx::query_as::<_, Restaurant>(logged(sql))
            .bind(&restaurant.name)
            .bind(&restaurant.address)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &[]))?;
        Ok(row)
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        let sql = "SELECT id, name, address FROM restaurants ORDER BY id";
        let rows = sqlx::query_as::<_, Restaurant>(logged(sql))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn restaurant_exists(&self, id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        row_exists(&mut *conn, "restaurants", id).await
    }

    async fn create_food_item(&self, item: NewFoodItem) -> Result<FoodItem, StoreError> {
        let mut tx = self.pool.begin().await?;
        if !row_exists(&mut *tx, "restaurants", item.restaurant_id).await? {
            return Err(StoreError::MissingReference {
                kind: "restaurant",
                id: item.restaurant_id,
            });
        }
        let sql = "INSERT INTO food_items (name, price, restaurant_id) VALUES ($1, $2, $3) \
                   RETURNING id, name, price, restaurant_id";
        let row = sqlx::query_as::<_, FoodItem>(logged(sql))
            .bind(&item.name)
            .bind(item.price)
            .bind(item.restaurant_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    &[("food_items_restaurant_id_fkey", "restaurant", item.restaurant_id)],
                )
            })?;
        tx.commit().await?;
        Ok(row)
    }

    async fn list_food_items(&self) -> Result<Vec<FoodItem>, StoreError> {
        let sql = "SELECT id, name, price, restaurant_id FROM food_items ORDER BY id";
        let rows = sqlx::query_as::<_, FoodItem>(logged(sql))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn food_item_exists(&self, id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        row_exists(&mut *conn, "food_items", id).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;
        if !row_exists(&mut *tx, "users", order.user_id).await? {
            return Err(StoreError::MissingReference {
                kind: "user",
                id: order.user_id,
            });
        }
        if !row_exists(&mut *tx, "food_items", order.food_item_id).await? {
            return Err(StoreError::MissingReference {
                kind: "food item",
                id: order.food_item_id,
            });
        }
        let sql = "INSERT INTO orders (user_id, food_item_id, quantity) VALUES ($1, $2, $3) \
                   RETURNING id, user_id, food_item_id, quantity, order_time";
        let row = sqlx::query_as::<_, Order>(logged(sql))
            .bind(order.user_id)
            .bind(order.food_item_id)
            .bind(order.quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    &[
                        ("orders_user_id_fkey", "user", order.user_id),
                        ("orders_food_item_id_fkey", "food item", order.food_item_id),
                    ],
                )
            })?;
        tx.commit().await?;
        Ok(row)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        let sql = "SELECT id, user_id, food_item_id, quantity, order_time FROM orders ORDER BY id";
        let rows = sqlx::query_as::<_, Order>(logged(sql))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn order_exists(&self, id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        row_exists(&mut *conn, "orders", id).await
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StoreError> {
        let sql = format!(
            "INSERT INTO payments (order_id, intent_id, amount, currency, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PAYMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, PaymentRow>(logged(&sql))
            .bind(payment.order_id)
            .bind(&payment.intent_id)
            .bind(payment.amount)
            .bind(&payment.currency)
            .bind(PaymentStatus::Created.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, &[("payments_order_id_fkey", "order", payment.order_id)])
            })?;
        row.try_into()
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, StoreError> {
        let sql = format!("SELECT {} FROM payments ORDER BY id", PAYMENT_COLUMNS);
        let rows = sqlx::query_as::<_, PaymentRow>(logged(&sql))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Payment::try_from).collect()
    }
}
