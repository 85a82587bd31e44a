#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use drinks_api::app::AppState;
use drinks_api::store::memory::InMemoryStore;
use drinks_authz::testing::{
    TEST_AUDIENCE, TEST_ISSUER_DOMAIN, mint_token, test_claims, test_jwks,
};
use drinks_authz::{
    Authorizer, Jwks, KeyDirectory, StaticKeyDirectory, TokenVerifier, VerifierConfig,
};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn json_request(
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_secs() as i64
}

/// `Bearer` header for a fixture token granting `permissions`.
pub fn bearer(permissions: &[&str]) -> String {
    format!("Bearer {}", mint_token("k1", &test_claims(now(), permissions)))
}

pub async fn state_with_directory(directory: Arc<dyn KeyDirectory>) -> AppState {
    let verifier = TokenVerifier::new(
        VerifierConfig::for_issuer_domain(TEST_ISSUER_DOMAIN, TEST_AUDIENCE),
        directory,
    );
    AppState {
        store: Arc::new(InMemoryStore::with_sample().await.expect("store")),
        authorizer: Arc::new(Authorizer::new(verifier)),
    }
}

/// State whose authorizer trusts the fixture key under `k1`.
pub async fn static_state() -> AppState {
    let directory = StaticKeyDirectory::from_jwks(&test_jwks("k1")).expect("directory");
    state_with_directory(Arc::new(directory)).await
}

/// Serves `/.well-known/jwks.json` from a swappable document.
pub async fn spawn_jwks_server(jwks: Jwks) -> (SocketAddr, Arc<RwLock<Jwks>>) {
    let shared = Arc::new(RwLock::new(jwks));
    let served = shared.clone();
    let app = axum::Router::new().route(
        "/.well-known/jwks.json",
        axum::routing::get(move || {
            let served = served.clone();
            async move { axum::Json(served.read().expect("jwks lock").clone()) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    (addr, shared)
}
