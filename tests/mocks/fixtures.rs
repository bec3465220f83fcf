//! Shared request fixtures

#![allow(dead_code)]

use meta_aggregator::config::{ConfigurableValue, Settings};

pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const TAKER: &str = "0x742d35Cc6634C0532925a3b8D2a27F79c5a85b03";
pub const ONE_ETH: &str = "1000000000000000000";

pub const API_TOKEN: &str = "test-token-123";

/// Query string selling one WETH for USDC
pub fn price_query() -> String {
	format!("buyToken={}&sellToken={}&sellAmount={}", USDC, WETH, ONE_ETH)
}

pub fn quote_query(provider: &str) -> String {
	format!("{}&provider={}&takerAddress={}", price_query(), provider, TAKER)
}

/// Settings with no configured providers and tight timeouts
pub fn test_settings() -> Settings {
	let mut settings = Settings::default();
	settings.aggregation.global_timeout_ms = 1000;
	settings.aggregation.per_provider_timeout_ms = 500;
	settings.aggregation.price_cache_ttl_secs = 5;
	settings.security.api_tokens = vec![ConfigurableValue::from_plain(API_TOKEN)];
	settings
}
