//! Service routes: root banner, liveness, readiness, build version.

use crate::response::MessageBody;
use crate::state::AppState;
use crate::store::StoreError;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ProbeBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct VersionBody {
    name: &'static str,
    version: &'static str,
}

async fn root() -> Json<MessageBody> {
    Json(MessageBody {
        message: "Food Delivery Backend is running!".to_string(),
    })
}

async fn health() -> Json<ProbeBody> {
    Json(ProbeBody {
        status: "ok",
        database: None,
        error: None,
    })
}

/// 503 carrying the store's error when the ping fails.
fn readiness(ping: Result<(), StoreError>) -> (StatusCode, Json<ProbeBody>) {
    match ping {
        Ok(()) => (
            StatusCode::OK,
            Json(ProbeBody {
                status: "ok",
                database: Some("ok"),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProbeBody {
                    status: "degraded",
                    database: Some("unavailable"),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ProbeBody>) {
    readiness(state.store.ping().await)
}

async fn version() -> Json<VersionBody> {
    Json(VersionBody {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_when_store_answers() {
        let (status, Json(body)) = readiness(Ok(()));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.database, Some("ok"));
        assert!(body.error.is_none());
    }

    #[test]
    fn unavailable_store_reports_its_error() {
        let (status, Json(body)) = readiness(Err(StoreError::Database(sqlx::Error::PoolTimedOut)));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.error, Some(sqlx::Error::PoolTimedOut.to_string()));
    }
}
