//! Price aggregation across providers
//!
//! One request fans out to every adapter configured for its chain. Each
//! call runs as its own task under a per-provider timeout, the whole fan-out
//! is bounded by a global deadline, and the caller's cancellation token
//! stops everything still in flight. Failures stay with the provider that
//! produced them; the caller only sees the ranked successes.

use meta_adapters::{ProviderRegistry, RegistryError};
use meta_config::AggregationSettings;
use meta_types::{
	AggregationMetadata, AggregationResult, PriceRequest, ProviderAdapter, ProviderError,
	ProviderErrorKind, ProviderPriceQuote, ProviderSwapQuote, ValidationError,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{timeout, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::quote_cache::{QuoteCache, QuoteCacheKey};
use crate::ranking::{rank, BestAmountPolicy, RankingPolicy};

/// Errors that can occur during aggregation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregatorServiceError {
	#[error("Chain {chain_id} is not supported")]
	UnsupportedChain { chain_id: u64 },

	#[error("Provider '{provider}' is not available on chain {chain_id}")]
	UnsupportedProvider { provider: String, chain_id: u64 },

	#[error("No provider returned a quote for chain {chain_id}")]
	NoQuotesAvailable { chain_id: u64 },

	#[error(transparent)]
	Provider(#[from] ProviderError),

	#[error("Invalid request: {0}")]
	Validation(#[from] ValidationError),

	#[error("Registry error: {0}")]
	Registry(RegistryError),

	#[error("Request cancelled")]
	Cancelled,
}

impl From<RegistryError> for AggregatorServiceError {
	fn from(error: RegistryError) -> Self {
		match error {
			RegistryError::UnsupportedChain { chain_id } => Self::UnsupportedChain { chain_id },
			RegistryError::UnsupportedProvider { provider, chain_id } => {
				Self::UnsupportedProvider { provider, chain_id }
			},
			other => Self::Registry(other),
		}
	}
}

pub type AggregatorResult<T> = Result<T, AggregatorServiceError>;

/// How a single provider call ended
#[derive(Debug)]
enum ProviderOutcome {
	Quoted(ProviderPriceQuote),
	Failed(ProviderError),
	TimedOut,
	Cancelled,
}

/// Service for aggregating prices from multiple providers
#[derive(Debug, Clone)]
pub struct AggregatorService {
	registry: Arc<ProviderRegistry>,
	cache: QuoteCache,
	policy: Arc<dyn RankingPolicy>,
	global_timeout: Duration,
	per_provider_timeout: Duration,
}

impl AggregatorService {
	pub fn new(registry: Arc<ProviderRegistry>, settings: &AggregationSettings) -> Self {
		Self {
			registry,
			cache: QuoteCache::new(Duration::from_secs(settings.price_cache_ttl_secs)),
			policy: Arc::new(BestAmountPolicy::new(settings.provider_preference.clone())),
			global_timeout: Duration::from_millis(settings.global_timeout_ms),
			per_provider_timeout: Duration::from_millis(settings.per_provider_timeout_ms),
		}
	}

	/// Replace the default ranking policy
	pub fn with_policy(mut self, policy: Arc<dyn RankingPolicy>) -> Self {
		self.policy = policy;
		self
	}

	pub fn cache(&self) -> &QuoteCache {
		&self.cache
	}

	/// Sweep expired price results and idle HTTP clients every `interval`
	/// until `cancel` fires
	pub fn start_cleanup_task(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
		let cache = self.cache.clone();
		let registry = self.registry.clone();
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			// First tick completes immediately
			ticker.tick().await;
			loop {
				tokio::select! {
					_ = cancel.cancelled() => {
						debug!("Cleanup task stopped");
						break;
					}
					_ = ticker.tick() => {
						let entries = cache.cleanup_expired();
						let clients = registry.cleanup_idle_clients();
						if entries + clients > 0 {
							debug!(entries, clients, "Swept expired cache entries");
						}
					}
				}
			}
		})
	}

	pub fn supported_chains(&self) -> Vec<u64> {
		self.registry.supported_chains()
	}

	pub fn providers_for(&self, chain_id: u64) -> Vec<String> {
		self.registry.providers_for(chain_id)
	}

	/// Best price across all providers on the chain, or from one named
	/// provider. `None` when no provider produced a quote.
	pub async fn get_best_price(
		&self,
		request: &PriceRequest,
		provider: Option<&str>,
		cancel: &CancellationToken,
	) -> AggregatorResult<Option<ProviderPriceQuote>> {
		match self.get_aggregation(request, provider, cancel).await {
			Ok(result) => Ok(result.best().cloned()),
			Err(AggregatorServiceError::NoQuotesAvailable { .. }) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Every successful quote, best first
	pub async fn get_all_prices(
		&self,
		request: &PriceRequest,
		cancel: &CancellationToken,
	) -> AggregatorResult<Vec<ProviderPriceQuote>> {
		match self.get_aggregation(request, None, cancel).await {
			Ok(result) => Ok(result.quotes),
			Err(AggregatorServiceError::NoQuotesAvailable { .. }) => Ok(Vec::new()),
			Err(e) => Err(e),
		}
	}

	/// Ranked quotes together with fan-out metadata
	///
	/// Served from the price cache when an identical request was answered
	/// within the TTL. Fails with `NoQuotesAvailable` when every provider
	/// failed; such outcomes are not cached.
	pub async fn get_aggregation(
		&self,
		request: &PriceRequest,
		provider: Option<&str>,
		cancel: &CancellationToken,
	) -> AggregatorResult<AggregationResult> {
		let adapters = self.registry.resolve(request.chain_id, provider)?;

		let key = QuoteCacheKey::new(request, provider);
		if let Some(cached) = self.cache.get(&key) {
			debug!(
				"Price cache hit for chain {} ({} -> {})",
				request.chain_id, request.sell_token, request.buy_token
			);
			return Ok(cached.as_cached());
		}

		let result = self.fan_out(request, adapters, cancel).await?;
		self.cache.put(key, Arc::new(result.clone()));
		Ok(result)
	}

	/// Executable swap from exactly one provider; never cached
	pub async fn get_swap_quote(
		&self,
		request: &PriceRequest,
		provider: &str,
		cancel: &CancellationToken,
	) -> AggregatorResult<ProviderSwapQuote> {
		let taker = request
			.taker_address
			.as_deref()
			.ok_or_else(|| ValidationError::MissingField {
				field: "takerAddress".to_string(),
			})?;

		let adapter = self
			.registry
			.resolve(request.chain_id, Some(provider))?
			.into_iter()
			.next()
			.ok_or_else(|| AggregatorServiceError::UnsupportedProvider {
				provider: provider.to_string(),
				chain_id: request.chain_id,
			})?;

		debug!(
			"Requesting swap from {} on chain {} for {}",
			provider, request.chain_id, taker
		);

		tokio::select! {
			_ = cancel.cancelled() => Err(AggregatorServiceError::Cancelled),
			result = timeout(self.per_provider_timeout, adapter.get_swap(request, taker)) => match result {
				Ok(Ok(swap)) => Ok(swap),
				Ok(Err(e)) => {
					warn!("Swap quote from {} failed: {}", provider, e);
					Err(e.into())
				},
				Err(_) => Err(ProviderError::Timeout {
					provider: provider.to_string(),
					timeout_ms: self.per_provider_timeout.as_millis() as u64,
				}
				.into()),
			},
		}
	}

	async fn fan_out(
		&self,
		request: &PriceRequest,
		adapters: Vec<Arc<dyn ProviderAdapter>>,
		cancel: &CancellationToken,
	) -> AggregatorResult<AggregationResult> {
		let started = Instant::now();
		let chain_id = request.chain_id;
		let mut metadata = AggregationMetadata {
			providers_queried: adapters.len(),
			..Default::default()
		};

		info!(
			"Fetching prices for chain {} from {} provider(s)",
			chain_id,
			adapters.len()
		);

		// Tasks observe `children`; it is cancelled when this future ends or
		// is dropped, and dropping `tasks` aborts anything still running
		let children = cancel.child_token();
		let _stop_children = children.clone().drop_guard();
		let shared_request = Arc::new(request.clone());
		let mut tasks = JoinSet::new();

		for adapter in adapters {
			let request = Arc::clone(&shared_request);
			let token = children.clone();
			let per_provider_timeout = self.per_provider_timeout;

			tasks.spawn(async move {
				let name = adapter.name().to_string();
				let outcome = tokio::select! {
					_ = token.cancelled() => ProviderOutcome::Cancelled,
					result = timeout(per_provider_timeout, adapter.get_price(&request)) => match result {
						Ok(Ok(quote)) => ProviderOutcome::Quoted(quote),
						Ok(Err(e)) => ProviderOutcome::Failed(e),
						Err(_) => ProviderOutcome::TimedOut,
					},
				};
				(name, outcome)
			});
		}

		let deadline = tokio::time::sleep(self.global_timeout);
		tokio::pin!(deadline);
		let mut quotes = Vec::new();

		loop {
			tokio::select! {
				biased;

				_ = cancel.cancelled() => {
					debug!("Price aggregation for chain {} cancelled", chain_id);
					tasks.abort_all();
					return Err(AggregatorServiceError::Cancelled);
				}
				joined = tasks.join_next() => match joined {
					None => break,
					Some(Ok((name, outcome))) => match outcome {
						ProviderOutcome::Quoted(quote) => {
							debug!("Provider {} quoted {}", name, quote.buy_amount);
							metadata.providers_succeeded += 1;
							quotes.push(quote);
						},
						ProviderOutcome::Failed(e) if e.kind() == ProviderErrorKind::Timeout => {
							warn!("Provider {} timed out: {}", name, e);
							metadata.providers_timed_out += 1;
						},
						ProviderOutcome::Failed(e) => {
							warn!("Provider {} failed: {}", name, e);
							metadata.providers_failed += 1;
						},
						ProviderOutcome::TimedOut => {
							warn!(
								"Provider {} exceeded {}ms",
								name,
								self.per_provider_timeout.as_millis()
							);
							metadata.providers_timed_out += 1;
						},
						ProviderOutcome::Cancelled => {
							metadata.providers_failed += 1;
						},
					},
					Some(Err(join_error)) => {
						warn!("Provider task ended abnormally: {}", join_error);
						metadata.providers_failed += 1;
					},
				},
				_ = &mut deadline => {
					let pending = tasks.len();
					warn!(
						"Global timeout of {}ms reached with {} provider(s) pending",
						self.global_timeout.as_millis(),
						pending
					);
					metadata.providers_timed_out += pending;
					tasks.abort_all();
					break;
				}
			}
		}

		metadata.total_duration_ms = started.elapsed().as_millis() as u64;

		info!(
			"Aggregation for chain {} finished in {}ms: {} succeeded, {} failed, {} timed out",
			chain_id,
			metadata.total_duration_ms,
			metadata.providers_succeeded,
			metadata.providers_failed,
			metadata.providers_timed_out
		);

		if quotes.is_empty() {
			return Err(AggregatorServiceError::NoQuotesAvailable { chain_id });
		}

		Ok(AggregationResult::new(rank(self.policy.as_ref(), &quotes), metadata))
	}
}
