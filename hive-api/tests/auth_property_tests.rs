//! Property-Based Tests for the Auth Pipeline
//!
//! - A non-root principal reaches a package only when its ACL lists it.
//! - Inside its ACL, a method is allowed exactly when its roles satisfy the
//!   default policy: reads for anyone, writes for power/admin, deletes for admin.
//! - Requests authenticate independently: a token-less request after a valid
//!   one is always rejected.

#[path = "support/app.rs"]
mod app;

use app::{request, send, test_app};
use axum::http::{Method, StatusCode};
use hive_api::{authorize, AccessPolicy, AuthContext, ErrorCode};
use hive_test_utils::{
    acl_strategy, can_delete, can_write, method_strategy, roles_strategy, segment_strategy,
    TEST_ROOT_TOKEN,
};
use proptest::prelude::*;
use tokio::runtime::Runtime;

fn expected_allowed(method: &Method, roles: &[String]) -> bool {
    match *method {
        Method::GET | Method::HEAD | Method::OPTIONS => true,
        Method::POST | Method::PUT | Method::PATCH => can_write(roles),
        Method::DELETE => can_delete(roles),
        _ => can_delete(roles),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_acl_gates_first_segment(
        acl in acl_strategy(),
        roles in roles_strategy(),
        segment in segment_strategy(),
        method in method_strategy(),
    ) {
        let ctx = AuthContext::user("someone", roles, acl.clone());
        let method: Method = method.parse().unwrap();
        let path = format!("/{}/item", segment);

        let result = authorize(&ctx, &path, &method, &AccessPolicy::default());
        if !acl.contains(&segment) {
            prop_assert_eq!(result.unwrap_err().code, ErrorCode::Forbidden);
        } else {
            prop_assert!(result.map(|_| true).unwrap_or_else(|e| e.code != ErrorCode::Forbidden));
        }
    }

    #[test]
    fn prop_method_policy_matches_roles(
        roles in roles_strategy(),
        segment in segment_strategy(),
        method in method_strategy(),
    ) {
        let ctx = AuthContext::user("someone", roles.clone(), vec![segment.clone()]);
        let method: Method = method.parse().unwrap();
        let path = format!("/{}", segment);

        let result = authorize(&ctx, &path, &method, &AccessPolicy::default());
        if expected_allowed(&method, &roles) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result.unwrap_err().code, ErrorCode::MethodNotAllowed);
        }
    }

    #[test]
    fn prop_root_bypasses_policy(segment in segment_strategy(), method in method_strategy()) {
        let method: Method = method.parse().unwrap();
        let path = format!("/{}/x", segment);
        prop_assert!(authorize(&AuthContext::root(), &path, &method, &AccessPolicy::default()).is_ok());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_tokenless_request_never_inherits_identity(key in "[a-z]{1,8}[0-9]") {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let (router, _state) = test_app();
            let uri = format!("/links/{}", key);

            let (status, _) = send(&router, request("GET", &uri, Some(TEST_ROOT_TOKEN), None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, _) = send(&router, request("GET", &uri, None, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        });
    }
}
