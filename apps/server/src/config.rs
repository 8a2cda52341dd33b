use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context};
use quotefeed_market_data::{AssetType, CacheTtl, DefaultRoutes, FailurePolicy, RouteSlot};

/// Server configuration, read from `QF_*` environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub cache_ttl: CacheTtl,
    pub cache_capacity: u64,
    pub failure_policy: FailurePolicy,
    pub fixer_api_key: Option<String>,
    pub routes: DefaultRoutes,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let listen_addr: SocketAddr = var("QF_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid QF_LISTEN_ADDR")?;
        let cors_allow = var("QF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = parse_number(var("QF_REQUEST_TIMEOUT_MS"), "QF_REQUEST_TIMEOUT_MS", 30_000)?;
        let valid_ttl = parse_number(var("QF_CACHE_TTL_SECS"), "QF_CACHE_TTL_SECS", 3_600)?;
        let invalid_ttl = parse_number(
            var("QF_INVALID_CACHE_TTL_SECS"),
            "QF_INVALID_CACHE_TTL_SECS",
            300,
        )?;
        let cache_capacity = parse_number(var("QF_CACHE_CAPACITY"), "QF_CACHE_CAPACITY", 10_000)?;
        let failure_policy = match var("QF_FAIL_ON_PROVIDER_ERROR") {
            Some(value) => value
                .parse::<FailurePolicy>()
                .map_err(|e| anyhow!("Invalid QF_FAIL_ON_PROVIDER_ERROR: {}", e))?,
            None => FailurePolicy::default(),
        };

        let mut routes = DefaultRoutes::standard();
        for asset_type in AssetType::ALL {
            for slot in RouteSlot::ALL {
                let key = format!(
                    "QF_ROUTE_{}{}",
                    asset_type.config_key(),
                    slot.config_suffix()
                );
                if let Some(value) = var(key.as_str()) {
                    let provider_id = value.to_ascii_uppercase();
                    let provider_id = (provider_id != "NONE").then_some(provider_id);
                    routes.set_slot(asset_type, slot, provider_id);
                }
            }
        }

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            cache_ttl: CacheTtl::new(
                Duration::from_secs(valid_ttl),
                Duration::from_secs(invalid_ttl),
            ),
            cache_capacity,
            failure_policy,
            fixer_api_key: var("QF_FIXER_API_KEY"),
            routes,
        })
    }
}

fn parse_number(value: Option<String>, key: &str, default: u64) -> anyhow::Result<u64> {
    match value {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid {}: {:?}", key, value)),
        None => Ok(default),
    }
}
