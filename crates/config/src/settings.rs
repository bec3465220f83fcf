//! Configuration settings structures

use crate::configurable_value::ConfigurableValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
	pub server: ServerSettings,
	/// Providers keyed by provider name (`zeroex`, `oneinch`, ...)
	pub providers: HashMap<String, ProviderSettings>,
	pub aggregation: AggregationSettings,
	pub logging: LoggingSettings,
	pub security: SecuritySettings,
}

/// Server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

/// Which wire client to build for a provider
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
	/// 0x Swap API v1
	ZeroEx,
	/// 1inch Aggregation API v5.2
	OneInch,
}

/// Individual provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
	pub provider_type: ProviderType,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	/// Per-call timeout enforced by the provider's HTTP client
	#[serde(default = "default_provider_timeout_ms")]
	pub timeout_ms: u64,
	pub api_key: Option<ConfigurableValue>,
	/// Chains served by this provider, each with its own base endpoint
	#[serde(default)]
	pub chains: Vec<ChainEndpoint>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChainEndpoint {
	pub chain_id: u64,
	pub endpoint: String,
}

/// Fan-out, caching and ranking configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AggregationSettings {
	/// Deadline for a whole fan-out
	pub global_timeout_ms: u64,
	/// Upper bound on a single provider call, applied on top of the
	/// provider's own client timeout
	pub per_provider_timeout_ms: u64,
	/// Lifetime of cached price results
	pub price_cache_ttl_secs: u64,
	/// Run a background sweep of expired cache entries at this interval
	pub cache_cleanup_interval_secs: Option<u64>,
	/// Tie-break order between providers, most preferred first
	pub provider_preference: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Security configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SecuritySettings {
	/// Bearer tokens accepted on the swap quote endpoint
	///
	/// Each entry is a configurable value, e.g. `"env:META_AGG_API_TOKEN"`.
	/// With no tokens configured the quote endpoint rejects every caller.
	pub api_tokens: Vec<ConfigurableValue>,
	/// HS256 key for JWT bearer tokens; takes precedence over `api_tokens`
	pub jwt_secret: Option<ConfigurableValue>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
	#[error("{field} must be greater than zero")]
	ZeroTimeout { field: String },

	#[error("per-provider timeout ({per_provider_ms}ms) exceeds global timeout ({global_ms}ms)")]
	PerProviderExceedsGlobal { per_provider_ms: u64, global_ms: u64 },

	#[error("provider '{provider}' is enabled but serves no chains")]
	ProviderWithoutChains { provider: String },

	#[error("provider '{provider}' lists chain {chain_id} more than once")]
	DuplicateChain { provider: String, chain_id: u64 },
}

fn default_enabled() -> bool {
	true
}

fn default_provider_timeout_ms() -> u64 {
	3000
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			server: ServerSettings::default(),
			providers: HashMap::new(),
			aggregation: AggregationSettings::default(),
			logging: LoggingSettings::default(),
			security: SecuritySettings::default(),
		}
	}
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 3000,
		}
	}
}

impl Default for AggregationSettings {
	fn default() -> Self {
		Self {
			global_timeout_ms: 5000,
			per_provider_timeout_ms: 3000,
			price_cache_ttl_secs: 5,
			cache_cleanup_interval_secs: None,
			provider_preference: Vec::new(),
		}
	}
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

impl Settings {
	/// Get server bind address
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.server.host, self.server.port)
	}

	/// Get enabled providers only
	pub fn enabled_providers(&self) -> HashMap<String, ProviderSettings> {
		self.providers
			.iter()
			.filter(|(_, config)| config.enabled)
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		let aggregation = &self.aggregation;
		if aggregation.global_timeout_ms == 0 {
			return Err(ConfigValidationError::ZeroTimeout {
				field: "aggregation.global_timeout_ms".to_string(),
			});
		}
		if aggregation.per_provider_timeout_ms == 0 {
			return Err(ConfigValidationError::ZeroTimeout {
				field: "aggregation.per_provider_timeout_ms".to_string(),
			});
		}
		if aggregation.per_provider_timeout_ms > aggregation.global_timeout_ms {
			return Err(ConfigValidationError::PerProviderExceedsGlobal {
				per_provider_ms: aggregation.per_provider_timeout_ms,
				global_ms: aggregation.global_timeout_ms,
			});
		}

		for (name, provider) in self.enabled_providers() {
			if provider.timeout_ms == 0 {
				return Err(ConfigValidationError::ZeroTimeout {
					field: format!("providers.{}.timeout_ms", name),
				});
			}
			if provider.chains.is_empty() {
				return Err(ConfigValidationError::ProviderWithoutChains { provider: name });
			}
			let mut seen = std::collections::HashSet::new();
			for chain in &provider.chains {
				if !seen.insert(chain.chain_id) {
					return Err(ConfigValidationError::DuplicateChain {
						provider: name,
						chain_id: chain.chain_id,
					});
				}
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn zeroex(chains: Vec<u64>) -> ProviderSettings {
		ProviderSettings {
			provider_type: ProviderType::ZeroEx,
			enabled: true,
			timeout_ms: 2000,
			api_key: None,
			chains: chains
				.into_iter()
				.map(|chain_id| ChainEndpoint {
					chain_id,
					endpoint: "https://api.0x.org".to_string(),
				})
				.collect(),
		}
	}

	#[test]
	fn test_defaults_are_valid() {
		let settings = Settings::default();
		assert!(settings.validate().is_ok());
		assert_eq!(settings.aggregation.price_cache_ttl_secs, 5);
		assert_eq!(settings.bind_address(), "0.0.0.0:3000");
	}

	#[test]
	fn test_per_provider_timeout_cannot_exceed_global() {
		let mut settings = Settings::default();
		settings.aggregation.per_provider_timeout_ms = 10_000;
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::PerProviderExceedsGlobal { .. })
		));
	}

	#[test]
	fn test_enabled_provider_needs_chains() {
		let mut settings = Settings::default();
		settings.providers.insert("zeroex".to_string(), zeroex(vec![]));
		assert_eq!(
			settings.validate(),
			Err(ConfigValidationError::ProviderWithoutChains {
				provider: "zeroex".to_string()
			})
		);

		settings.providers.get_mut("zeroex").unwrap().enabled = false;
		assert!(settings.validate().is_ok());
		assert!(settings.enabled_providers().is_empty());
	}

	#[test]
	fn test_duplicate_chain_rejected() {
		let mut settings = Settings::default();
		settings.providers.insert("zeroex".to_string(), zeroex(vec![1, 1]));
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::DuplicateChain { chain_id: 1, .. })
		));
	}

	#[test]
	fn test_partial_json_uses_defaults() {
		let settings: Settings = serde_json::from_str(
			r#"{
				"providers": {
					"oneinch": {
						"provider_type": "oneinch",
						"api_key": "env:ONEINCH_API_KEY",
						"chains": [{ "chain_id": 56, "endpoint": "https://api.1inch.dev/swap/v5.2" }]
					}
				},
				"aggregation": { "price_cache_ttl_secs": 10 }
			}"#,
		)
		.unwrap();

		let oneinch = &settings.providers["oneinch"];
		assert!(oneinch.enabled);
		assert_eq!(oneinch.timeout_ms, 3000);
		assert_eq!(oneinch.provider_type, ProviderType::OneInch);
		assert_eq!(settings.aggregation.price_cache_ttl_secs, 10);
		assert_eq!(settings.aggregation.global_timeout_ms, 5000);
		assert_eq!(settings.server.port, 3000);
	}

	#[test]
	fn test_server_port_alone_is_enough() {
		let settings: Settings =
			serde_json::from_str(r#"{ "server": { "port": 8080 } }"#).unwrap();
		assert_eq!(settings.server.port, 8080);
		assert_eq!(settings.server.host, "0.0.0.0");
		assert!(settings.security.jwt_secret.is_none());
	}

	#[test]
	fn test_jwt_secret_parses_as_configurable_value() {
		let settings: Settings =
			serde_json::from_str(r#"{ "security": { "jwt_secret": "env:META_AGG_JWT_SECRET" } }"#)
				.unwrap();
		assert_eq!(
			settings.security.jwt_secret,
			Some(ConfigurableValue::from_env("META_AGG_JWT_SECRET"))
		);
		assert!(settings.security.api_tokens.is_empty());
	}
}
