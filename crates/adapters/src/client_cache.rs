//! HTTP client cache for provider adapters
//!
//! One `reqwest::Client` per distinct provider endpoint configuration, with
//! connection pooling and keep-alive, expired after a TTL.

use dashmap::DashMap;
use meta_types::{ProviderError, ProviderResult};
use reqwest::{Client, ClientBuilder};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for creating provider HTTP clients
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	/// Base endpoint for the provider
	pub base_url: String,
	/// Provider name for cache differentiation
	pub provider: String,
	/// Whole-request timeout enforced by the client
	pub timeout_ms: u64,
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	/// Connection keep-alive timeout
	pub keep_alive_timeout_ms: u64,
	/// Default headers (API keys among them)
	pub headers: Vec<(String, String)>,
}

impl ClientConfig {
	pub fn new(provider: &str, base_url: &str, timeout_ms: u64) -> Self {
		Self {
			base_url: base_url.to_string(),
			provider: provider.to_string(),
			timeout_ms,
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers: vec![
				("User-Agent".to_string(), "Meta-Aggregator/1.0".to_string()),
				("Accept".to_string(), "application/json".to_string()),
			],
		}
	}

	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		self.headers.push((name.to_string(), value.to_string()));
		self
	}
}

// Header values may hold API keys
impl fmt::Debug for ClientConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
		f.debug_struct("ClientConfig")
			.field("base_url", &self.base_url)
			.field("provider", &self.provider)
			.field("timeout_ms", &self.timeout_ms)
			.field("headers", &header_names)
			.finish()
	}
}

#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients, shared by every adapter built from
/// the same settings
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with default 30-minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create a client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> ProviderResult<Arc<Client>> {
		self.clients.remove_if(config, |_, cached| {
			let is_expired = cached.is_expired(self.ttl);
			if is_expired {
				warn!(
					"Client cache expired for {} (age: {:?}), will create new client",
					config.base_url,
					cached.created_at.elapsed()
				);
			}
			is_expired
		});

		if let Some(cached) = self.clients.get(config) {
			return Ok(cached.client.clone());
		}

		debug!("Creating new client for {} ({})", config.provider, config.base_url);
		let cached = CachedClient::new(Self::build_client(config)?);

		use dashmap::mapref::entry::Entry;

		// Another caller may have inserted meanwhile; theirs wins
		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => {
				let client = cached.client.clone();
				entry.insert(cached);
				Ok(client)
			},
		}
	}

	fn build_client(config: &ClientConfig) -> ProviderResult<Client> {
		let mut header_map = reqwest::header::HeaderMap::new();
		for (key, value) in &config.headers {
			match (
				reqwest::header::HeaderName::from_bytes(key.as_bytes()),
				reqwest::header::HeaderValue::from_str(value),
			) {
				(Ok(name), Ok(mut value)) => {
					value.set_sensitive(true);
					header_map.insert(name, value);
				},
				_ => warn!("Skipping invalid header '{}' for {}", key, config.provider),
			}
		}

		ClientBuilder::new()
			.timeout(Duration::from_millis(config.timeout_ms))
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.default_headers(header_map)
			.build()
			.map_err(|e| ProviderError::unavailable(&config.provider, format!("client setup failed: {}", e)))
	}

	/// Remove all expired clients, returning how many were dropped
	pub fn cleanup_expired(&self) -> usize {
		let mut removed_count = 0;
		self.clients.retain(|_, cached| {
			let is_expired = cached.is_expired(self.ttl);
			if is_expired {
				removed_count += 1;
			}
			!is_expired
		});

		if removed_count > 0 {
			debug!("Cleaned up {} expired clients from cache", removed_count);
		}
		removed_count
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}
