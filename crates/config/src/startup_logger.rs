//! Startup and shutdown banners for the meta aggregator service

use std::env;
use tracing::info;

use crate::Settings;

/// Logs service information at startup
pub fn log_service_info() {
	// Root package name, not this crate's
	let service_name = "meta-aggregator";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== Meta Aggregator Service Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the effective provider and aggregation setup without secrets
pub fn log_settings_summary(settings: &Settings) {
	let aggregation = &settings.aggregation;
	info!(
		"⏱️ Timeouts: global {}ms, per provider {}ms",
		aggregation.global_timeout_ms, aggregation.per_provider_timeout_ms
	);
	info!("🗄️ Price cache TTL: {}s", aggregation.price_cache_ttl_secs);

	let mut names: Vec<_> = settings.providers.keys().collect();
	names.sort();
	for name in names {
		let provider = &settings.providers[name];
		let chains: Vec<String> = provider
			.chains
			.iter()
			.map(|chain| chain.chain_id.to_string())
			.collect();
		info!(
			"🔌 Provider {} ({:?}) enabled={} chains=[{}] api_key={}",
			name,
			provider.provider_type,
			provider.enabled,
			chains.join(", "),
			provider
				.api_key
				.as_ref()
				.map(|key| key.description())
				.unwrap_or_else(|| "none".to_string())
		);
	}

	match &settings.security.jwt_secret {
		Some(secret) => info!("🔐 Quote endpoint accepts JWTs signed with {}", secret.description()),
		None => info!(
			"🔐 Quote endpoint tokens configured: {}",
			settings.security.api_tokens.len()
		),
	}
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 Meta Aggregator Service Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs startup completion
pub fn log_startup_complete(bind_address: &str) {
	info!("✅ Meta Aggregator Service Started Successfully");
	info!("🌐 Server listening on: {}", bind_address);
}
