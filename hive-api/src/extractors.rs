//! Request extractors that reject with structured [`ApiError`]s.
//!
//! Axum's stock `Json` and `Path` rejections are plain text; these wrappers
//! turn them into the JSON error body every other failure uses.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use hive_core::{is_blank_key, is_reserved_key};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::invalid_input(rejection.body_text())),
        }
    }
}

/// The `:key` path parameter of an item route. Never blank, never reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ItemKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(key) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;

        if is_blank_key(&key) {
            return Err(ApiError::missing_field("key"));
        }
        if is_reserved_key(&key) {
            return Err(ApiError::invalid_input(format!("'{}' is a reserved key", key)));
        }
        Ok(ItemKey(key))
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
