//! Permission middleware.
//!
//! # Key invariants
//! - The wrapped handler runs only after the token verified and carried the
//!   gate's permission; it then finds the [`ClaimSet`] in request extensions.
//! - Failures are answered with the error envelope and counted in
//!   `drinks_auth_failures_total{code}`. Token contents are never logged.
use crate::api::error::ApiError;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use drinks_authz::{AuthError, Authorizer, ClaimSet, Permission};
use std::sync::Arc;

/// Middleware state: the shared authorizer plus the one permission a route
/// requires.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    pub authorizer: Arc<Authorizer>,
    pub permission: Permission,
}

pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(value) => Some(value.to_string()),
            Err(_) => return reject(&gate, AuthError::AuthHeaderMalformed),
        },
    };

    let outcome = gate
        .authorizer
        .guard(
            header.as_deref(),
            Some(gate.permission.as_str()),
            |claims: ClaimSet| async move {
                request.extensions_mut().insert(claims);
                next.run(request).await
            },
        )
        .await;
    match outcome {
        Ok(response) => response,
        Err(err) => reject(&gate, err),
    }
}

fn reject(gate: &PermissionGate, err: AuthError) -> Response {
    metrics::counter!("drinks_auth_failures_total", "code" => err.code()).increment(1);
    if matches!(err, AuthError::KeyDirectoryUnavailable(_)) {
        tracing::error!(error = %err, permission = %gate.permission, "authorization unavailable");
    } else {
        tracing::debug!(error = %err, permission = %gate.permission, "request not authorized");
    }
    ApiError::from(err).into_response()
}
