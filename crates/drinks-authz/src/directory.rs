//! Signing key directories.
//!
//! # Purpose
//! Supply the verification keys currently published by the trusted issuer.
//!
//! # Key invariants
//! - A directory never returns an empty key set; that is reported as
//!   [`AuthError::KeyDirectoryUnavailable`].
//! - Key sets are immutable snapshots behind `Arc`; a refresh swaps the
//!   snapshot and never mutates one a caller is holding.
//!
//! # Concurrency model
//! [`RemoteKeyDirectory`] keeps a single snapshot behind a `RwLock`. Readers
//! clone the `Arc` and release the lock immediately. Fetches are serialized
//! by a separate mutex: callers that queued behind a fetch reuse its result
//! instead of issuing their own request.
use crate::{AuthError, AuthResult, Jwks, KeySet};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

pub const DEFAULT_JWKS_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait KeyDirectory: Send + Sync {
    /// Current key set, served from cache when fresh.
    async fn keys(&self) -> AuthResult<Arc<KeySet>>;

    /// Fetch a new key set regardless of cache state.
    async fn refresh(&self) -> AuthResult<Arc<KeySet>>;
}

/// Fixed key set, for tests and deployments with pinned keys.
#[derive(Debug, Clone)]
pub struct StaticKeyDirectory {
    keys: Arc<KeySet>,
}

impl StaticKeyDirectory {
    pub fn new(keys: KeySet) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn from_jwks(jwks: &Jwks) -> AuthResult<Self> {
        KeySet::from_jwks(jwks).map(Self::new)
    }
}

#[async_trait]
impl KeyDirectory for StaticKeyDirectory {
    async fn keys(&self) -> AuthResult<Arc<KeySet>> {
        if self.keys.is_empty() {
            return Err(AuthError::KeyDirectoryUnavailable(
                "static key set is empty".to_string(),
            ));
        }
        Ok(self.keys.clone())
    }

    async fn refresh(&self) -> AuthResult<Arc<KeySet>> {
        self.keys().await
    }
}

#[derive(Debug, Clone)]
struct CachedKeys {
    keys: Arc<KeySet>,
    fetched_at: Instant,
    expires_at: Instant,
}

/// Key directory backed by the issuer's JWKS endpoint.
#[derive(Debug, Clone)]
pub struct RemoteKeyDirectory {
    jwks_url: String,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedKeys>>>,
    fetch_lock: Arc<Mutex<()>>,
    ttl: Duration,
}

impl RemoteKeyDirectory {
    /// Build a directory for `jwks_url`.
    ///
    /// `ttl` should be shorter than the issuer's key rotation overlap;
    /// unknown key ids trigger a refresh regardless. `timeout` bounds each
    /// fetch, and a timed-out fetch reports `KeyDirectoryUnavailable`.
    pub fn new(jwks_url: impl Into<String>, ttl: Duration, timeout: Duration) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::KeyDirectoryUnavailable(format!("http client: {err}")))?;
        Ok(Self {
            jwks_url: jwks_url.into(),
            client,
            cache: Arc::new(RwLock::new(None)),
            fetch_lock: Arc::new(Mutex::new(())),
            ttl,
        })
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    async fn snapshot(&self) -> Option<CachedKeys> {
        self.cache.read().await.clone()
    }

    async fn fresh(&self) -> Option<Arc<KeySet>> {
        self.snapshot()
            .await
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| cached.keys)
    }

    async fn fetch(&self) -> AuthResult<Jwks> {
        let unavailable = |stage: &str, err: reqwest::Error| {
            AuthError::KeyDirectoryUnavailable(format!("{stage} {}: {err}", self.jwks_url))
        };
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|err| unavailable("fetch jwks from", err))?
            .error_for_status()
            .map_err(|err| unavailable("jwks status from", err))?;
        response
            .json::<Jwks>()
            .await
            .map_err(|err| unavailable("decode jwks from", err))
    }

    /// Fetch and publish a new snapshot. Callers hold `fetch_lock`.
    async fn fetch_and_store(&self) -> AuthResult<Arc<KeySet>> {
        let keys = match self.fetch().await.and_then(|jwks| KeySet::from_jwks(&jwks)) {
            Ok(keys) => Arc::new(keys),
            Err(err) => {
                metrics::counter!("drinks_jwks_fetch_total", "outcome" => "error").increment(1);
                tracing::warn!(error = %err, "jwks refresh failed");
                return Err(err);
            }
        };
        metrics::counter!("drinks_jwks_fetch_total", "outcome" => "ok").increment(1);
        tracing::debug!(url = %self.jwks_url, keys = keys.len(), "jwks refreshed");
        let now = Instant::now();
        *self.cache.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: now,
            expires_at: now + self.ttl,
        });
        Ok(keys)
    }
}

#[async_trait]
impl KeyDirectory for RemoteKeyDirectory {
    async fn keys(&self) -> AuthResult<Arc<KeySet>> {
        if let Some(keys) = self.fresh().await {
            return Ok(keys);
        }
        let _fetch = self.fetch_lock.lock().await;
        if let Some(keys) = self.fresh().await {
            return Ok(keys);
        }
        self.fetch_and_store().await
    }

    async fn refresh(&self) -> AuthResult<Arc<KeySet>> {
        let requested_at = Instant::now();
        let _fetch = self.fetch_lock.lock().await;
        // A fetch that completed while this caller waited is already fresher
        // than anything it asked for.
        if let Some(cached) = self.snapshot().await
            && cached.fetched_at > requested_at
        {
            return Ok(cached.keys);
        }
        self.fetch_and_store().await
    }
}
