//! Integration tests for permission-gated routes.
//!
//! # Purpose
//! Exercise the router against a live JWKS endpoint and check that every
//! authorization outcome maps to its status, code and envelope, and that a
//! rejected request never reaches its handler.
//!
//! # Key invariants
//! - 401 for header, token, key, signature and claim failures.
//! - 400 when the permissions claim is absent, 403 when the permission is
//!   not granted, 500 when the key directory cannot be reached.
//!
//! # How to use
//! Run with `cargo test -p drinks-api --test drinks_auth`.
mod common;

use axum::http::StatusCode;
use common::{
    bearer, json_request, now, read_json, request, spawn_jwks_server, state_with_directory,
    static_state,
};
use drinks_api::app::build_router;
use drinks_authz::RemoteKeyDirectory;
use drinks_authz::testing::{mint_token, test_claims, test_jwks, unsigned_token};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn remote_state(jwks_url: String) -> drinks_api::app::AppState {
    let directory = RemoteKeyDirectory::new(jwks_url, Duration::from_secs(600), Duration::from_secs(2))
        .expect("directory");
    state_with_directory(Arc::new(directory)).await
}

async fn assert_envelope(response: axum::response::Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status, "unexpected status for {code}");
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(status.as_u16()));
    assert_eq!(body["code"], json!(code));
    assert!(body["message"].as_str().is_some_and(|message| !message.is_empty()));
}

#[tokio::test]
async fn remote_keys_authorize_detail_listing() {
    let (addr, _jwks) = spawn_jwks_server(test_jwks("k1")).await;
    let app = build_router(remote_state(format!("http://{addr}/.well-known/jwks.json")).await);

    let auth = bearer(&["get:drinks-detail"]);
    let response = app
        .oneshot(request("GET", "/drinks-detail", Some(&auth)))
        .await
        .expect("detail");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["drinks"][0]["title"], json!("water"));
}

#[tokio::test]
async fn header_problems_are_unauthorized() {
    let app = build_router(static_state().await);
    let token = mint_token("k1", &test_claims(now(), &["get:drinks-detail"]));

    let response = app
        .clone()
        .oneshot(request("GET", "/drinks-detail", None))
        .await
        .expect("missing");
    assert_envelope(response, StatusCode::UNAUTHORIZED, "authorization_header_missing").await;

    for header in [
        token.clone(),
        format!("bearer {token}"),
        format!("Bearer {token} extra"),
        "Bearer".to_string(),
    ] {
        let response = app
            .clone()
            .oneshot(request("GET", "/drinks-detail", Some(&header)))
            .await
            .expect("malformed");
        assert_envelope(response, StatusCode::UNAUTHORIZED, "invalid_header").await;
    }
}

#[tokio::test]
async fn token_problems_are_unauthorized() {
    let app = build_router(static_state().await);
    let claims = test_claims(now(), &["get:drinks-detail"]);

    let mut expired = test_claims(now() - 7200, &["get:drinks-detail"]);
    expired["exp"] = json!(now() - 3600);
    let mut wrong_audience = claims.clone();
    wrong_audience["aud"] = json!("billing");

    let valid = mint_token("k1", &claims);
    let dot = valid.rfind('.').expect("signature");
    let mut tampered = valid.clone().into_bytes();
    tampered[dot + 5] = if tampered[dot + 5] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).expect("ascii");

    let cases = [
        ("not-a-jwt".to_string(), "invalid_token"),
        (
            unsigned_token(&json!({"alg": "none", "kid": "k1"}), &claims),
            "invalid_token",
        ),
        (
            unsigned_token(&json!({"alg": "HS256", "kid": "k1"}), &claims),
            "invalid_token",
        ),
        (mint_token("k9", &claims), "key_not_found"),
        (tampered, "invalid_signature"),
        (mint_token("k1", &expired), "token_expired"),
        (mint_token("k1", &wrong_audience), "invalid_claims"),
    ];
    for (token, code) in cases {
        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/drinks-detail",
                Some(&format!("Bearer {token}")),
            ))
            .await
            .expect("response");
        assert_envelope(response, StatusCode::UNAUTHORIZED, code).await;
    }
}

#[tokio::test]
async fn token_expired_a_second_ago_is_rejected() {
    let app = build_router(static_state().await);
    let mut claims = test_claims(now() - 3600, &["get:drinks-detail"]);
    claims["exp"] = json!(now() - 1);
    let header = format!("Bearer {}", mint_token("k1", &claims));
    let response = app
        .oneshot(request("GET", "/drinks-detail", Some(&header)))
        .await
        .expect("expired");
    assert_envelope(response, StatusCode::UNAUTHORIZED, "token_expired").await;
}

#[tokio::test]
async fn permission_outcomes_are_bad_request_or_forbidden() {
    let app = build_router(static_state().await);

    let mut no_permissions = test_claims(now(), &[]);
    no_permissions
        .as_object_mut()
        .expect("object")
        .remove("permissions");
    let header = format!("Bearer {}", mint_token("k1", &no_permissions));
    let response = app
        .clone()
        .oneshot(request("GET", "/drinks-detail", Some(&header)))
        .await
        .expect("missing claim");
    assert_envelope(response, StatusCode::BAD_REQUEST, "permissions_missing").await;

    let header = bearer(&["get:drinks-detail"]);
    let response = app
        .oneshot(request("DELETE", "/drinks/1", Some(&header)))
        .await
        .expect("denied");
    assert_envelope(response, StatusCode::FORBIDDEN, "forbidden").await;
}

#[tokio::test]
async fn rejected_requests_never_reach_handlers() {
    let state = static_state().await;
    let store = state.store.clone();
    let app = build_router(state);

    let barista = bearer(&["get:drinks-detail", "post:drinks"]);
    let response = app
        .clone()
        .oneshot(request("DELETE", "/drinks/1", Some(&barista)))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/drinks/1",
            None,
            json!({"title": "renamed"}),
        ))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A body the handler would reject is never parsed when auth fails first.
    let response = app
        .oneshot(json_request(
            "POST",
            "/drinks",
            Some("Bearer not.a.token"),
            json!({"title": ""}),
        ))
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let drinks = store.list().await.expect("list");
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0].title, "water");
}

#[tokio::test]
async fn unreachable_key_directory_is_server_error() {
    let app = build_router(
        remote_state("http://127.0.0.1:1/.well-known/jwks.json".to_string()).await,
    );
    let header = bearer(&["get:drinks-detail"]);
    let response = app
        .clone()
        .oneshot(request("GET", "/drinks-detail", Some(&header)))
        .await
        .expect("response");
    assert_envelope(
        response,
        StatusCode::INTERNAL_SERVER_ERROR,
        "key_directory_unavailable",
    )
    .await;

    // The public listing does not depend on the key directory.
    let response = app
        .oneshot(request("GET", "/drinks", None))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rotated_signing_key_is_picked_up_without_restart() {
    let (addr, jwks) = spawn_jwks_server(test_jwks("k1")).await;
    let app = build_router(remote_state(format!("http://{addr}/.well-known/jwks.json")).await);

    let first = bearer(&["get:drinks-detail"]);
    let response = app
        .clone()
        .oneshot(request("GET", "/drinks-detail", Some(&first)))
        .await
        .expect("first");
    assert_eq!(response.status(), StatusCode::OK);

    *jwks.write().expect("jwks lock") = test_jwks("k2");
    let rotated = format!(
        "Bearer {}",
        mint_token("k2", &test_claims(now(), &["get:drinks-detail"]))
    );
    let response = app
        .clone()
        .oneshot(request("GET", "/drinks-detail", Some(&rotated)))
        .await
        .expect("rotated");
    assert_eq!(response.status(), StatusCode::OK);

    // The retired kid is gone after the refresh.
    let response = app
        .oneshot(request("GET", "/drinks-detail", Some(&first)))
        .await
        .expect("retired");
    assert_envelope(response, StatusCode::UNAUTHORIZED, "key_not_found").await;
}
