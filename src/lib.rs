//! Meta Aggregator
//!
//! Best-price quoting across multiple DEX aggregators. The builder wires the
//! provider registry, the aggregation service and the HTTP router together.
//!
//! ```rust,no_run
//! use meta_aggregator::AggregatorBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     AggregatorBuilder::new().start_server().await
//! }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub use meta_adapters as adapters;
pub use meta_api as api;
pub use meta_config as config;
pub use meta_service as service;
pub use meta_types as models;

pub use meta_adapters::{OneInchAdapter, ProviderRegistry, RegistryError, ZeroExAdapter};
pub use meta_api::{
	create_router, AppState, AuthContext, Authenticator, BearerTokenAuthenticator, JwtAuthenticator,
	JwtClaims, NoAuthenticator,
};
pub use meta_config::{load_config, LogFormat, Settings};
pub use meta_service::{AggregatorService, AggregatorServiceError, BestAmountPolicy, RankingPolicy};
pub use meta_types::{
	AggregationResult, PriceRequest, ProviderAdapter, ProviderError, ProviderPriceQuote,
	ProviderSwapQuote, U256,
};

/// Builder for a configured aggregator and its HTTP router
pub struct AggregatorBuilder {
	settings: Option<Settings>,
	extra_providers: Vec<(u64, Arc<dyn ProviderAdapter>)>,
	authenticator: Option<Arc<dyn Authenticator>>,
	policy: Option<Arc<dyn RankingPolicy>>,
	shutdown: CancellationToken,
}

impl Default for AggregatorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl AggregatorBuilder {
	pub fn new() -> Self {
		Self {
			settings: None,
			extra_providers: Vec::new(),
			authenticator: None,
			policy: None,
			shutdown: CancellationToken::new(),
		}
	}

	/// Use explicit settings instead of loading them from config/env
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Register an adapter on top of the configured providers
	pub fn with_provider(mut self, chain_id: u64, adapter: Arc<dyn ProviderAdapter>) -> Self {
		self.extra_providers.push((chain_id, adapter));
		self
	}

	/// Replace the bearer-token authenticator built from `security.api_tokens`
	pub fn with_auth<A>(mut self, authenticator: A) -> Self
	where
		A: Authenticator + 'static,
	{
		self.authenticator = Some(Arc::new(authenticator));
		self
	}

	pub fn with_ranking_policy(mut self, policy: Arc<dyn RankingPolicy>) -> Self {
		self.policy = Some(policy);
		self
	}

	/// Token that stops background tasks started by [`Self::start`]
	pub fn shutdown_token(&self) -> CancellationToken {
		self.shutdown.clone()
	}

	/// Initialize tracing from the logging settings
	///
	/// `RUST_LOG` wins over the configured level when set.
	pub fn init_tracing_from_settings(
		settings: &Settings,
	) -> Result<(), Box<dyn std::error::Error>> {
		let logging = &settings.logging;
		let env_filter = EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

		let result = match logging.format {
			LogFormat::Json => fmt()
				.json()
				.with_env_filter(env_filter)
				.with_target(logging.structured)
				.with_thread_ids(logging.structured)
				.try_init(),
			LogFormat::Pretty => fmt()
				.pretty()
				.with_env_filter(env_filter)
				.with_target(logging.structured)
				.with_thread_ids(logging.structured)
				.try_init(),
			LogFormat::Compact => fmt()
				.compact()
				.with_env_filter(env_filter)
				.with_target(logging.structured)
				.with_thread_ids(logging.structured)
				.try_init(),
		};

		result.map_err(|e| e as Box<dyn std::error::Error>)
	}

	/// Build the registry, service and router without binding a socket
	pub async fn start(self) -> Result<(Router, AppState), Box<dyn std::error::Error>> {
		let settings = self.settings.unwrap_or_default();
		settings.validate()?;

		let mut registry = ProviderRegistry::from_settings(&settings)?;
		for (chain_id, adapter) in self.extra_providers {
			registry.register(chain_id, adapter)?;
		}
		if registry.is_empty() {
			warn!("No providers configured; every price request will fail with an unsupported chain");
		}

		let mut service = AggregatorService::new(Arc::new(registry), &settings.aggregation);
		if let Some(policy) = self.policy {
			service = service.with_policy(policy);
		}

		if let Some(interval_secs) = settings.aggregation.cache_cleanup_interval_secs {
			service.start_cleanup_task(Duration::from_secs(interval_secs.max(1)), self.shutdown.child_token());
			info!("Cache cleanup every {}s", interval_secs.max(1));
		}

		let authenticator = match (self.authenticator, &settings.security.jwt_secret) {
			(Some(authenticator), _) => authenticator,
			(None, Some(secret)) => {
				info!("Quote endpoint expects JWT bearer tokens ({})", secret.description());
				Arc::new(JwtAuthenticator::new(&secret.resolve_secret()?)) as Arc<dyn Authenticator>
			},
			(None, None) => {
				let tokens = settings
					.security
					.api_tokens
					.iter()
					.map(|token| token.resolve_secret())
					.collect::<Result<Vec<_>, _>>()?;
				if tokens.is_empty() {
					warn!("No API tokens configured; the quote endpoint will reject every request");
				}
				Arc::new(BearerTokenAuthenticator::new(tokens)) as Arc<dyn Authenticator>
			},
		};

		let state = AppState::new(Arc::new(service));
		let router = create_router(authenticator).with_state(state.clone());

		Ok((router, state))
	}

	/// Load configuration, initialize logging and serve until Ctrl-C
	pub async fn start_server(mut self) -> Result<(), Box<dyn std::error::Error>> {
		dotenvy::dotenv().ok();

		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config()?,
		};
		Self::init_tracing_from_settings(&settings)?;

		meta_config::log_service_info();
		meta_config::log_settings_summary(&settings);

		let bind_addr = settings.bind_address();
		let addr: SocketAddr = bind_addr.parse()?;
		let shutdown = self.shutdown.clone();

		let (app, _state) = self.with_settings(settings).start().await?;

		let listener = tokio::net::TcpListener::bind(addr).await?;
		meta_config::log_startup_complete(&bind_addr);
		info!("Endpoints:");
		info!("  GET  /health");
		info!("  GET  /v1/info");
		info!("  GET  /v1/{{chain_id}}/price");
		info!("  GET  /v1/{{chain_id}}/price/all");
		info!("  GET  /v1/{{chain_id}}/quote  (bearer token)");

		axum::serve(listener, app)
			.with_graceful_shutdown(shutdown_signal(shutdown))
			.await?;

		meta_config::log_service_shutdown();
		Ok(())
	}
}

async fn shutdown_signal(shutdown: CancellationToken) {
	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("Failed to listen for shutdown signal: {}", e);
	}
	shutdown.cancel();
}
