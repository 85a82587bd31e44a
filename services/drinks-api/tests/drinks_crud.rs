//! Integration tests for the drinks resource.
//!
//! # Purpose
//! Drive the full router with valid tokens and check response shapes, the
//! 404/422 envelope, CORS headers and the public endpoints.
//!
//! # How to use
//! Run with `cargo test -p drinks-api --test drinks_crud`.
mod common;

use axum::http::{Method, StatusCode};
use common::{bearer, json_request, read_json, request, static_state};
use drinks_api::app::build_router;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn public_listing_uses_short_form_without_token() {
    let app = build_router(static_state().await);
    let response = app
        .oneshot(request("GET", "/drinks", None))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "drinks": [{"id": 1, "title": "water", "recipe": [{"color": "blue", "parts": 1}]}]
        })
    );
}

#[tokio::test]
async fn detail_listing_uses_long_form() {
    let app = build_router(static_state().await);
    let auth = bearer(&["get:drinks-detail"]);
    let response = app
        .oneshot(request("GET", "/drinks-detail", Some(&auth)))
        .await
        .expect("detail");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], json!("water"));
}

#[tokio::test]
async fn create_patch_delete_round_trip() {
    let app = build_router(static_state().await);
    let auth = bearer(&[
        "get:drinks-detail",
        "post:drinks",
        "patch:drinks",
        "delete:drinks",
    ]);

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/drinks",
            Some(&auth),
            json!({
                "title": "matcha shake",
                "recipe": [
                    {"name": "milk", "color": "grey", "parts": 1},
                    {"name": "matcha", "color": "green", "parts": 3}
                ]
            }),
        ))
        .await
        .expect("create");
    assert_eq!(created.status(), StatusCode::OK);
    let body = read_json(created).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["drinks"].as_array().map(Vec::len), Some(1));
    let id = body["drinks"][0]["id"].as_u64().expect("id");
    assert_eq!(body["drinks"][0]["recipe"][1]["name"], json!("matcha"));

    let patched = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/drinks/{id}"),
            Some(&auth),
            json!({"title": "iced matcha"}),
        ))
        .await
        .expect("patch");
    assert_eq!(patched.status(), StatusCode::OK);
    let body = read_json(patched).await;
    assert_eq!(body["drinks"][0]["title"], json!("iced matcha"));
    assert_eq!(body["drinks"][0]["recipe"][0]["name"], json!("milk"));

    let deleted = app
        .clone()
        .oneshot(request("DELETE", &format!("/drinks/{id}"), Some(&auth)))
        .await
        .expect("delete");
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        read_json(deleted).await,
        json!({"success": true, "delete": id})
    );

    let listing = app
        .oneshot(request("GET", "/drinks", None))
        .await
        .expect("list");
    let body = read_json(listing).await;
    assert_eq!(body["drinks"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn single_ingredient_recipe_is_accepted() {
    let app = build_router(static_state().await);
    let auth = bearer(&["post:drinks"]);
    let response = app
        .oneshot(json_request(
            "POST",
            "/drinks",
            Some(&auth),
            json!({"title": "espresso", "recipe": {"name": "coffee", "color": "brown", "parts": 1}}),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["drinks"][0]["recipe"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn invalid_or_duplicate_drinks_are_unprocessable() {
    let app = build_router(static_state().await);
    let auth = bearer(&["post:drinks", "patch:drinks"]);
    let cases = [
        json!({"recipe": [{"name": "water", "color": "blue", "parts": 1}]}),
        json!({"title": "", "recipe": [{"name": "water", "color": "blue", "parts": 1}]}),
        json!({"title": "no recipe"}),
        json!({"title": "empty recipe", "recipe": []}),
        json!({"title": "bad recipe", "recipe": "water"}),
        json!({"title": "water", "recipe": [{"name": "water", "color": "blue", "parts": 1}]}),
    ];
    for case in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/drinks", Some(&auth), case.clone()))
            .await
            .expect("create");
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "expected 422 for {case}"
        );
        assert_eq!(
            read_json(response).await,
            json!({"success": false, "error": 422, "message": "unprocessable", "code": "unprocessable"})
        );
    }

    let response = app
        .oneshot(json_request(
            "PATCH",
            "/drinks/1",
            Some(&auth),
            json!({"recipe": []}),
        ))
        .await
        .expect("patch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_ids_and_routes_are_not_found() {
    let app = build_router(static_state().await);
    let auth = bearer(&["patch:drinks", "delete:drinks"]);

    let cases = [
        json_request("PATCH", "/drinks/42", Some(&auth), json!({"title": "ghost"})),
        request("DELETE", "/drinks/42", Some(&auth)),
        request("DELETE", "/drinks/not-a-number", Some(&auth)),
        request("GET", "/cocktails", None),
    ];
    for case in cases {
        let response = app.clone().oneshot(case).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!(404));
        assert_eq!(body["message"], json!("resource not found"));
    }
}

#[tokio::test]
async fn malformed_json_uses_envelope() {
    let app = build_router(static_state().await);
    let auth = bearer(&["post:drinks"]);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/drinks")
        .header("content-type", "application/json")
        .header("authorization", auth)
        .body(axum::body::Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(request).await.expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(400));
}

#[tokio::test]
async fn cors_preflight_allows_authorization_header() {
    let app = build_router(static_state().await);
    let request = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/drinks")
        .header("origin", "http://localhost:8100")
        .header("access-control-request-method", "PATCH")
        .header(
            "access-control-request-headers",
            "authorization,content-type",
        )
        .body(axum::body::Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("preflight");
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    let allow_headers = headers
        .get("access-control-allow-headers")
        .and_then(|value| value.to_str().ok())
        .expect("allow headers")
        .to_ascii_lowercase();
    assert!(allow_headers.contains("authorization"));
    assert!(allow_headers.contains("content-type"));
    let allow_methods = headers
        .get("access-control-allow-methods")
        .and_then(|value| value.to_str().ok())
        .expect("allow methods");
    for method in ["GET", "PATCH", "POST", "DELETE", "OPTIONS"] {
        assert!(allow_methods.contains(method), "missing {method}");
    }
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = build_router(static_state().await);
    let response = app
        .clone()
        .oneshot(request("GET", "/health", None))
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"status": "ok"}));

    let response = app
        .oneshot(request("GET", "/openapi.json", None))
        .await
        .expect("openapi");
    assert_eq!(response.status(), StatusCode::OK);
    let doc = read_json(response).await;
    assert!(doc["paths"]["/drinks-detail"]["get"].is_object());
}
