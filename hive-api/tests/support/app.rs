#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hive_api::packages::User;
use hive_api::{create_router, AuthConfig, HiveState};
use hive_events::{Dispatcher, DispatcherConfig};
use hive_test_utils::TEST_ROOT_TOKEN;
use serde_json::Value;
use tower::ServiceExt;

pub const VIEWER_TOKEN: &str = "tok_viewer_backups";
pub const POWER_TOKEN: &str = "tok_power_backups";
pub const ADMIN_TOKEN: &str = "tok_admin_everything";

fn user(nickname: &str, token: &str, roles: &[&str], acl: &[&str]) -> User {
    User {
        nickname: nickname.to_string(),
        full_name: String::new(),
        token_hash: token.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        acl: acl.iter().map(|a| a.to_string()).collect(),
        active: true,
    }
}

/// Full application with three users seeded:
/// a viewer and a power user limited to `backups`, and an admin.
pub fn test_app() -> (Router, HiveState) {
    test_app_with(DispatcherConfig::default())
}

pub fn test_app_with(config: DispatcherConfig) -> (Router, HiveState) {
    let dispatcher = Dispatcher::spawn(config);
    let state = HiveState::new(dispatcher);

    let users = state.users.cache();
    users.set("viewer", user("viewer", VIEWER_TOKEN, &[], &["backups"]));
    users.set("power", user("power", POWER_TOKEN, &["power"], &["backups"]));
    users.set(
        "admin",
        user(
            "admin",
            ADMIN_TOKEN,
            &["admin"],
            &["users", "links", "projects", "backups", "infra", "dish", "system"],
        ),
    );

    let router = create_router(&state, AuthConfig::new(TEST_ROOT_TOKEN), &[])
        .expect("router should build");
    (router, state)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-auth-token", token);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

/// Send one request and decode the JSON body (`Value::Null` when empty or not JSON).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
