//! Drinks API application wiring.
//!
//! # Purpose
//! Builds the axum router, attaches one permission gate per protected
//! method, and installs the CORS, tracing and panic layers.
//!
//! # Notes
//! Every route appears once in [`build_router`]; a path serving several
//! methods gets a single method router with a gate on each gated method.
use crate::api;
use crate::api::error::{panic_response, route_not_found};
use crate::auth::{PermissionGate, require_permission};
use crate::config::DrinksApiConfig;
use crate::observability;
use crate::store::DrinkStore;
use crate::store::memory::InMemoryStore;
use anyhow::Context;
use axum::Router;
use axum::http::{HeaderName, Method, header};
use axum::routing::{MethodRouter, delete, get, patch, post};
use drinks_authz::{Authorizer, Permission, RemoteKeyDirectory, TokenVerifier};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;

const CORS_HEADERS: [HeaderName; 2] = [header::CONTENT_TYPE, header::AUTHORIZATION];
const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
    Method::OPTIONS,
];

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore + Send + Sync>,
    pub authorizer: Arc<Authorizer>,
}

/// Assemble the store and the authorizer described by `config`.
pub async fn build_state(config: &DrinksApiConfig) -> anyhow::Result<AppState> {
    let store = if config.seed_sample {
        InMemoryStore::with_sample()
            .await
            .context("seed sample drink")?
    } else {
        InMemoryStore::new()
    };
    let auth = &config.auth;
    let directory = RemoteKeyDirectory::new(auth.jwks_url(), auth.jwks_ttl, auth.jwks_timeout)
        .context("build jwks client")?;
    tracing::info!(
        issuer = %auth.issuer(),
        audience = %auth.api_audience,
        jwks_url = %directory.jwks_url(),
        "token verification configured"
    );
    let verifier = TokenVerifier::new(auth.verifier_config(), Arc::new(directory));
    Ok(AppState {
        store: Arc::new(store),
        authorizer: Arc::new(Authorizer::new(verifier)),
    })
}

/// Wrap `route` so it only runs for tokens granting `permission`.
fn gated(
    state: &AppState,
    permission: Permission,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let gate = PermissionGate {
        authorizer: state.authorizer.clone(),
        permission,
    };
    route.route_layer(axum::middleware::from_fn_with_state(gate, require_permission))
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(CORS_HEADERS)
        .allow_methods(CORS_METHODS);

    Router::new()
        .route(
            "/drinks",
            get(api::drinks::list_drinks).merge(gated(
                &state,
                Permission::PostDrinks,
                post(api::drinks::create_drink),
            )),
        )
        .route(
            "/drinks-detail",
            gated(
                &state,
                Permission::GetDrinksDetail,
                get(api::drinks::list_drink_details),
            ),
        )
        .route(
            "/drinks/:drink_id",
            gated(
                &state,
                Permission::PatchDrinks,
                patch(api::drinks::patch_drink),
            )
            .merge(gated(
                &state,
                Permission::DeleteDrinks,
                delete(api::drinks::delete_drink),
            )),
        )
        .route("/health", get(api::system::health))
        .route("/openapi.json", get(api::system::openapi_json))
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}
