use anyhow::{Context, Result, bail};
use drinks_authz::{
    AllowedAlgorithms, DEFAULT_FETCH_TIMEOUT, DEFAULT_JWKS_TTL, DEFAULT_LEEWAY_SECONDS,
    VerifierConfig,
};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// Drinks API configuration sourced from environment variables, optionally
// overridden by the YAML file named in DRINKS_CONFIG.
#[derive(Debug, Clone)]
pub struct DrinksApiConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub seed_sample: bool,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer_domain: String,
    pub api_audience: String,
    pub allowed_algorithms: AllowedAlgorithms,
    pub jwks_url: Option<String>,
    pub jwks_ttl: Duration,
    pub jwks_timeout: Duration,
    pub leeway_seconds: u64,
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        drinks_authz::issuer_url(&self.issuer_domain)
    }

    pub fn jwks_url(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| drinks_authz::jwks_url(&self.issuer_domain))
    }

    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            issuer: self.issuer(),
            audience: self.api_audience.clone(),
            allowed_algorithms: self.allowed_algorithms.clone(),
            leeway_seconds: self.leeway_seconds,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DrinksApiConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    seed_sample: Option<bool>,
    #[serde(default)]
    auth: AuthConfigOverride,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AuthConfigOverride {
    issuer_domain: Option<String>,
    api_audience: Option<String>,
    allowed_algorithms: Option<String>,
    jwks_url: Option<String>,
    jwks_ttl_secs: Option<u64>,
    jwks_timeout_ms: Option<u64>,
    leeway_secs: Option<u64>,
}

impl DrinksApiConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self::read_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::read_env()?;
        if let Ok(path) = std::env::var("DRINKS_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read DRINKS_CONFIG: {path}"))?;
            let override_cfg: DrinksApiConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse drinks api config yaml")?;
            config.apply(override_cfg)?;
        }
        config.validate()?;
        Ok(config)
    }

    fn read_env() -> Result<Self> {
        Ok(Self {
            bind_addr: env_or("DRINKS_BIND", "0.0.0.0:5000")?,
            metrics_bind: env_or("DRINKS_METRICS_BIND", "0.0.0.0:9090")?,
            seed_sample: env_or("DRINKS_SEED_SAMPLE", "true")?,
            auth: AuthConfig {
                issuer_domain: std::env::var("DRINKS_AUTH_ISSUER_DOMAIN").unwrap_or_default(),
                api_audience: std::env::var("DRINKS_AUTH_AUDIENCE").unwrap_or_default(),
                allowed_algorithms: env_or("DRINKS_AUTH_ALGORITHMS", "RS256")?,
                jwks_url: std::env::var("DRINKS_AUTH_JWKS_URL").ok(),
                jwks_ttl: env_parsed("DRINKS_AUTH_JWKS_TTL_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_JWKS_TTL),
                jwks_timeout: env_parsed("DRINKS_AUTH_JWKS_TIMEOUT_MS")?
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT),
                leeway_seconds: env_parsed("DRINKS_AUTH_LEEWAY_SECS")?
                    .unwrap_or(DEFAULT_LEEWAY_SECONDS),
            },
        })
    }

    fn apply(&mut self, override_cfg: DrinksApiConfigOverride) -> Result<()> {
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = override_cfg.seed_sample {
            self.seed_sample = value;
        }
        let auth = override_cfg.auth;
        if let Some(value) = auth.issuer_domain {
            self.auth.issuer_domain = value;
        }
        if let Some(value) = auth.api_audience {
            self.auth.api_audience = value;
        }
        if let Some(value) = auth.allowed_algorithms {
            self.auth.allowed_algorithms =
                value.parse().with_context(|| "parse auth.allowed_algorithms")?;
        }
        if let Some(value) = auth.jwks_url {
            self.auth.jwks_url = Some(value);
        }
        if let Some(value) = auth.jwks_ttl_secs {
            self.auth.jwks_ttl = Duration::from_secs(value);
        }
        if let Some(value) = auth.jwks_timeout_ms {
            self.auth.jwks_timeout = Duration::from_millis(value);
        }
        if let Some(value) = auth.leeway_secs {
            self.auth.leeway_seconds = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.auth.issuer_domain.trim().is_empty() {
            bail!("DRINKS_AUTH_ISSUER_DOMAIN must be set");
        }
        if self.auth.api_audience.trim().is_empty() {
            bail!("DRINKS_AUTH_AUDIENCE must be set");
        }
        if self.auth.jwks_timeout.is_zero() {
            bail!("DRINKS_AUTH_JWKS_TIMEOUT_MS must be greater than zero");
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("parse {key}"))
}

fn env_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    std::env::var(key)
        .ok()
        .map(|value| value.parse().with_context(|| format!("parse {key}")))
        .transpose()
}
