//! File configuration for gateways.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path passed to [`Config::load`]
//! 2. `~/.rpc-cachetools/config.toml` (user)
//! 3. `/etc/rpc-cachetools/config.toml` (system)
//!
//! ```toml
//! [defaults]
//! failover_timeout_secs = 1.0
//!
//! [cache]
//! max_entries = 10000
//! ttl_secs = 3600
//!
//! [services.some_other_service]
//! use_cache_first = true
//! ```
//!
//! Per-service sections override `[defaults]` field by field. Without a
//! `[cache]` bound, services get unbounded in-memory caches.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{BoundedCacheConfig, CacheRegistry};
use crate::gateway::GatewayConfig;
use crate::{CachetoolsError, Result};

/// Gateway configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Settings applied to every service.
    #[serde(default)]
    pub defaults: ServiceSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    /// Per-service overrides, keyed by service name.
    #[serde(default)]
    pub services: HashMap<String, ServiceSettings>,
}

/// Gateway settings; unset fields inherit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSettings {
    #[serde(default)]
    pub use_cache_first: Option<bool>,
    /// Fail-over deadline in seconds; 0 disables.
    #[serde(default)]
    pub failover_timeout_secs: Option<f64>,
    #[serde(default)]
    pub key_by_method: Option<bool>,
}

/// Cache storage bounds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Maximum entries per service.
    #[serde(default)]
    pub max_entries: Option<u64>,
    /// Entry time-to-live in seconds.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.rpc-cachetools/config.toml`
    /// 3. `/etc/rpc-cachetools/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            CachetoolsError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            CachetoolsError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CachetoolsError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(CachetoolsError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".rpc-cachetools").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/rpc-cachetools/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(CachetoolsError::Configuration(
            "No config file found. Create ~/.rpc-cachetools/config.toml or /etc/rpc-cachetools/config.toml"
                .to_string(),
        ))
    }

    /// Reject timeouts that cannot become a [`Duration`].
    fn validate(&self) -> Result<()> {
        self.defaults.failover_timeout()?;
        for (service, settings) in &self.services {
            settings.failover_timeout().map_err(|e| {
                CachetoolsError::Configuration(format!("service {service:?}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Effective gateway configuration for `service`.
    pub fn gateway_config(&self, service: &str) -> Result<GatewayConfig> {
        let overrides = self.services.get(service);
        let pick = |f: fn(&ServiceSettings) -> Option<bool>| {
            overrides
                .and_then(f)
                .or_else(|| f(&self.defaults))
                .unwrap_or(false)
        };

        let timeout = match overrides.map(ServiceSettings::failover_timeout).transpose()? {
            Some(Some(timeout)) => timeout,
            _ => self.defaults.failover_timeout()?.unwrap_or_default(),
        };

        Ok(GatewayConfig::new()
            .use_cache_first(pick(|s| s.use_cache_first))
            .key_by_method(pick(|s| s.key_by_method))
            .failover_timeout(timeout))
    }

    /// A registry whose service caches follow the `[cache]` section.
    pub fn cache_registry(&self) -> CacheRegistry {
        match self.cache.bounded() {
            Some(config) => CacheRegistry::bounded(config),
            None => CacheRegistry::new(),
        }
    }
}

impl ServiceSettings {
    fn failover_timeout(&self) -> Result<Option<Duration>> {
        self.failover_timeout_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|e| {
                    CachetoolsError::Configuration(format!(
                        "invalid failover_timeout_secs {secs}: {e}"
                    ))
                })
            })
            .transpose()
    }
}

impl CacheSettings {
    fn bounded(&self) -> Option<BoundedCacheConfig> {
        if self.max_entries.is_none() && self.ttl_secs.is_none() {
            return None;
        }
        let mut config = BoundedCacheConfig::new();
        if let Some(max) = self.max_entries {
            config = config.max_entries(max);
        }
        if let Some(ttl) = self.ttl_secs {
            config = config.ttl(Duration::from_secs(ttl));
        }
        Some(config)
    }
}
