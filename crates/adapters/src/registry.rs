//! Per-chain provider registry
//!
//! Built once at startup and read-only afterwards; lookups need no locking.

use meta_config::{ProviderType, Settings};
use meta_types::{ProviderAdapter, SecretString};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::client_cache::ClientCache;
use crate::http::HttpProviderConfig;
use crate::one_inch_adapter::OneInchAdapter;
use crate::zero_ex_adapter::ZeroExAdapter;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
	#[error("Chain {chain_id} is not supported")]
	UnsupportedChain { chain_id: u64 },

	#[error("Provider '{provider}' is not configured for chain {chain_id}")]
	UnsupportedProvider { provider: String, chain_id: u64 },

	#[error("Provider '{provider}' is already registered for chain {chain_id}")]
	DuplicateProvider { provider: String, chain_id: u64 },

	#[error("Invalid configuration for provider '{provider}': {reason}")]
	Configuration { provider: String, reason: String },
}

/// Provider adapters available on each chain
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
	chains: BTreeMap<u64, Vec<Arc<dyn ProviderAdapter>>>,
	clients: ClientCache,
}

impl ProviderRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build adapters for every enabled provider and chain in `settings`
	///
	/// All adapters share one HTTP client cache.
	pub fn from_settings(settings: &Settings) -> Result<Self, RegistryError> {
		let mut registry = Self::new();
		let cache = registry.clients.clone();

		let enabled = settings.enabled_providers();
		let mut names: Vec<&String> = enabled.keys().collect();
		names.sort();

		for name in names {
			let provider = &enabled[name];
			let api_key: Option<SecretString> = provider
				.api_key
				.as_ref()
				.map(|value| value.resolve_secret())
				.transpose()
				.map_err(|e| RegistryError::Configuration {
					provider: name.clone(),
					reason: e.to_string(),
				})?;

			for chain in &provider.chains {
				let config = HttpProviderConfig::new(name.clone(), &chain.endpoint, provider.timeout_ms)
					.map_err(|e| RegistryError::Configuration {
						provider: name.clone(),
						reason: format!("invalid endpoint '{}': {}", chain.endpoint, e),
					})?
					.with_api_key(api_key.clone());

				let adapter: Arc<dyn ProviderAdapter> = match provider.provider_type {
					ProviderType::ZeroEx => Arc::new(ZeroExAdapter::with_cache(config, cache.clone())),
					ProviderType::OneInch => Arc::new(OneInchAdapter::with_cache(config, cache.clone())),
				};
				registry.register(chain.chain_id, adapter)?;
			}
		}

		info!(
			"Provider registry ready: {} chain(s), {} adapter(s)",
			registry.chains.len(),
			registry.chains.values().map(Vec::len).sum::<usize>()
		);
		Ok(registry)
	}

	/// Add an adapter for a chain; names must be unique per chain
	pub fn register(
		&mut self,
		chain_id: u64,
		adapter: Arc<dyn ProviderAdapter>,
	) -> Result<(), RegistryError> {
		let adapters = self.chains.entry(chain_id).or_default();
		if adapters.iter().any(|existing| existing.name() == adapter.name()) {
			return Err(RegistryError::DuplicateProvider {
				provider: adapter.name().to_string(),
				chain_id,
			});
		}
		adapters.push(adapter);
		Ok(())
	}

	/// Adapters to query for a request
	///
	/// With a provider name the result holds exactly that adapter.
	pub fn resolve(
		&self,
		chain_id: u64,
		provider: Option<&str>,
	) -> Result<Vec<Arc<dyn ProviderAdapter>>, RegistryError> {
		let adapters = self
			.chains
			.get(&chain_id)
			.filter(|adapters| !adapters.is_empty())
			.ok_or(RegistryError::UnsupportedChain { chain_id })?;

		match provider {
			None => Ok(adapters.clone()),
			Some(name) => adapters
				.iter()
				.find(|adapter| adapter.name() == name)
				.map(|adapter| vec![adapter.clone()])
				.ok_or_else(|| RegistryError::UnsupportedProvider {
					provider: name.to_string(),
					chain_id,
				}),
		}
	}

	/// Chains with at least one provider, ascending
	pub fn supported_chains(&self) -> Vec<u64> {
		self.chains
			.iter()
			.filter(|(_, adapters)| !adapters.is_empty())
			.map(|(chain_id, _)| *chain_id)
			.collect()
	}

	/// Provider names on a chain, in registration order
	pub fn providers_for(&self, chain_id: u64) -> Vec<String> {
		self.chains
			.get(&chain_id)
			.map(|adapters| adapters.iter().map(|a| a.name().to_string()).collect())
			.unwrap_or_default()
	}

	pub fn is_empty(&self) -> bool {
		self.chains.values().all(Vec::is_empty)
	}

	/// HTTP clients shared by the adapters built in [`Self::from_settings`]
	pub fn clients(&self) -> &ClientCache {
		&self.clients
	}

	/// Drop HTTP clients past their TTL, returning how many were removed
	pub fn cleanup_idle_clients(&self) -> usize {
		self.clients.cleanup_expired()
	}
}
