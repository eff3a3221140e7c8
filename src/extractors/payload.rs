//! Create-endpoint input: a JSON body, or the query string when the request
//! carries no JSON content type. Rejections use the API error envelope.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A missing field or wrong type becomes a 422 `AppError`; a malformed JSON body a 400.
#[derive(Debug)]
pub struct Payload<T>(pub T);

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if has_json_content_type(req.headers()) {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            return Ok(Payload(value));
        }
        let (mut parts, _body) = req.into_parts();
        let Query(value) = Query::<T>::from_request_parts(&mut parts, state).await?;
        Ok(Payload(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_type(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn json_content_types() {
        assert!(has_json_content_type(&with_type("application/json")));
        assert!(has_json_content_type(&with_type("application/json; charset=utf-8")));
        assert!(has_json_content_type(&with_type("application/merge-patch+json")));
        assert!(!has_json_content_type(&with_type("application/x-www-form-urlencoded")));
        assert!(!has_json_content_type(&HeaderMap::new()));
    }
}
