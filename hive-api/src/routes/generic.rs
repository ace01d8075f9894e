//! Generic CRUD route handlers for [`Resource`] types.
//!
//! Every standard package exposes the same shape over its cache:
//!
//! - `GET /` - list all items
//! - `POST /restore` - bulk upsert `{items: {key: item}}`, blank and reserved keys skipped
//! - `GET /:key` - fetch one item (404 if absent)
//! - `POST /:key` - create (409 if the key exists)
//! - `PUT /:key`, `PATCH /:key` - replace (404 if absent)
//! - `DELETE /:key` - remove (404 if absent)
//!
//! ```ignore
//! PackageDescriptor::new("links")
//!     .with_cache(slot.clone())
//!     .with_routes(move |router| router.merge(crud_routes(slot.cache())))
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use hive_core::is_reserved_key;
use hive_storage::Cache;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ItemKey, JsonBody},
    resource::Resource,
};

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: HashMap<String, T>,
    pub count: usize,
}

/// Body of `POST /restore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreRequest<T> {
    pub items: HashMap<String, T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResponse {
    /// Items written
    pub count: usize,
    /// Items ignored because of a blank or reserved key, or failed validation
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub key: String,
    pub deleted: bool,
}

// ============================================================================
// GENERIC HANDLER HELPERS
// ============================================================================

/// All items with their count.
pub fn list_items<T: Resource>(cache: &Cache<T>) -> ListResponse<T> {
    let (items, count) = cache.get_all();
    ListResponse { items, count }
}

pub fn get_item<T: Resource>(cache: &Cache<T>, key: &str) -> ApiResult<T> {
    cache
        .get(key)
        .ok_or_else(|| ApiError::entity_not_found(T::KIND, key))
}

pub fn create_item<T: Resource>(cache: &Cache<T>, key: String, item: T) -> ApiResult<T> {
    item.validate()?;
    if cache.insert_new(key.clone(), item.clone()) {
        tracing::debug!(kind = T::KIND, key = %key, "Item created");
        Ok(item)
    } else {
        Err(ApiError::entity_already_exists(T::KIND, key))
    }
}

pub fn replace_item<T: Resource>(cache: &Cache<T>, key: &str, item: T) -> ApiResult<T> {
    item.validate()?;
    if cache.replace(key, item.clone()) {
        tracing::debug!(kind = T::KIND, key = %key, "Item replaced");
        Ok(item)
    } else {
        Err(ApiError::entity_not_found(T::KIND, key))
    }
}

pub fn delete_item<T: Resource>(cache: &Cache<T>, key: &str) -> ApiResult<T> {
    let removed = cache
        .take(key)
        .ok_or_else(|| ApiError::entity_not_found(T::KIND, key))?;
    tracing::debug!(kind = T::KIND, key = %key, "Item deleted");
    Ok(removed)
}

/// Apply every valid item independently. Nothing is rolled back.
pub fn restore_items<T: Resource>(cache: &Cache<T>, items: HashMap<String, T>) -> RestoreResponse {
    let total = items.len();
    let valid: Vec<(String, T)> = items
        .into_iter()
        .filter(|(key, item)| match item.validate() {
            Ok(()) if is_reserved_key(key) => {
                tracing::debug!(kind = T::KIND, key = %key, "Skipping reserved key");
                false
            }
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(kind = T::KIND, key = %key, error = %err, "Skipping invalid item");
                false
            }
        })
        .collect();

    let count = cache.restore(valid);
    tracing::info!(kind = T::KIND, count, total, "Restore applied");
    RestoreResponse {
        count,
        skipped: total - count,
    }
}

// ============================================================================
// GENERIC ROUTE FACTORY
// ============================================================================

/// Standard CRUD routes over `cache`, ready to merge into a package router.
pub fn crud_routes<T: Resource>(cache: Arc<Cache<T>>) -> Router {
    Router::new()
        .route("/", get(list_route::<T>))
        .route("/restore", post(restore_route::<T>))
        .route(
            "/:key",
            get(get_route::<T>)
                .post(create_route::<T>)
                .put(replace_route::<T>)
                .patch(replace_route::<T>)
                .delete(delete_route::<T>),
        )
        .with_state(cache)
}

async fn list_route<T: Resource>(State(cache): State<Arc<Cache<T>>>) -> Json<ListResponse<T>> {
    Json(list_items(&cache))
}

async fn get_route<T: Resource>(
    State(cache): State<Arc<Cache<T>>>,
    ItemKey(key): ItemKey,
) -> ApiResult<Json<T>> {
    get_item(&cache, &key).map(Json)
}

async fn create_route<T: Resource>(
    State(cache): State<Arc<Cache<T>>>,
    ItemKey(key): ItemKey,
    JsonBody(item): JsonBody<T>,
) -> ApiResult<impl IntoResponse> {
    let created = create_item(&cache, key, item)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn replace_route<T: Resource>(
    State(cache): State<Arc<Cache<T>>>,
    ItemKey(key): ItemKey,
    JsonBody(item): JsonBody<T>,
) -> ApiResult<Json<T>> {
    replace_item(&cache, &key, item).map(Json)
}

async fn delete_route<T: Resource>(
    State(cache): State<Arc<Cache<T>>>,
    ItemKey(key): ItemKey,
) -> ApiResult<Json<DeleteResponse>> {
    delete_item(&cache, &key)?;
    Ok(Json(DeleteResponse { key, deleted: true }))
}

async fn restore_route<T: Resource>(
    State(cache): State<Arc<Cache<T>>>,
    JsonBody(request): JsonBody<RestoreRequest<T>>,
) -> Json<RestoreResponse> {
    Json(restore_items(&cache, request.items))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::resource::require_field;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
    }

    impl Resource for Note {
        const KIND: &'static str = "Note";

        fn validate(&self) -> ApiResult<()> {
            require_field("title", &self.title)
        }
    }

    fn note(title: &str) -> Note {
        Note {
            title: title.to_string(),
        }
    }

    #[test]
    fn test_create_then_conflict() {
        let cache = Cache::new();
        assert!(create_item(&cache, "a".to_string(), note("first")).is_ok());
        let err = create_item(&cache, "a".to_string(), note("second")).unwrap_err();
        assert_eq!(err.code, ErrorCode::EntityAlreadyExists);
        assert_eq!(cache.get("a"), Some(note("first")));
    }

    #[test]
    fn test_create_validates() {
        let cache: Cache<Note> = Cache::new();
        let err = create_item(&cache, "a".to_string(), note(" ")).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_replace_missing_is_not_found() {
        let cache = Cache::new();
        let err = replace_item(&cache, "a", note("x")).unwrap_err();
        assert_eq!(err.code, ErrorCode::EntityNotFound);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let cache: Cache<Note> = Cache::new();
        let err = delete_item(&cache, "a").unwrap_err();
        assert_eq!(err.code, ErrorCode::EntityNotFound);
    }

    #[test]
    fn test_restore_skips_blank_and_invalid() {
        let cache = Cache::new();
        let mut items = HashMap::new();
        items.insert("ok".to_string(), note("fine"));
        items.insert("".to_string(), note("blank key"));
        items.insert("bad".to_string(), note(""));

        let response = restore_items(&cache, items);
        assert_eq!(response, RestoreResponse { count: 1, skipped: 2 });
        assert_eq!(cache.keys(), vec!["ok".to_string()]);
    }

    #[test]
    fn test_restore_skips_reserved_keys() {
        let cache = Cache::new();
        let mut items = HashMap::new();
        items.insert("ok".to_string(), note("fine"));
        items.insert("restore".to_string(), note("shadowed by the route"));
        items.insert("status".to_string(), note("shadowed by the route"));

        let response = restore_items(&cache, items);
        assert_eq!(response, RestoreResponse { count: 1, skipped: 2 });
        assert_eq!(cache.keys(), vec!["ok".to_string()]);
    }

    #[test]
    fn test_list_reports_count() {
        let cache = Cache::new();
        cache.set("a", note("a"));
        cache.set("b", note("b"));
        let listed = list_items(&cache);
        assert_eq!(listed.count, 2);
        assert_eq!(listed.items.len(), 2);
    }
}
