//! 1inch Aggregation API v5.2 adapter
//!
//! `GET {endpoint}/{chain_id}/quote` for prices and
//! `GET {endpoint}/{chain_id}/swap` for executable swaps. Slippage and fee
//! are sent as percentages, not fractions. Query parameters use the v5.2
//! names (`src`, `dst`, `from`, `referrer`).

use async_trait::async_trait;
use meta_types::{
	LiquiditySource, PriceRequest, ProviderAdapter, ProviderError, ProviderInfo,
	ProviderPriceQuote, ProviderResult, ProviderSwapQuote, U256,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http::{format_decimal, get_json, lenient_u64, HttpProviderConfig};

/// Adapter for the 1inch Aggregation API
#[derive(Debug)]
pub struct OneInchAdapter {
	info: ProviderInfo,
	config: HttpProviderConfig,
	cache: ClientCache,
}

impl OneInchAdapter {
	pub fn new(config: HttpProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::new())
	}

	pub fn with_cache(config: HttpProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: ProviderInfo::new(config.name.clone(), "1inch", "v5.2"),
			config,
			cache,
		}
	}

	fn client_config(&self) -> ClientConfig {
		let client_config = ClientConfig::new(
			&self.config.name,
			self.config.endpoint.as_str(),
			self.config.timeout_ms,
		);
		match &self.config.api_key {
			Some(key) => client_config
				.with_header("Authorization", &format!("Bearer {}", key.expose_secret())),
			None => client_config,
		}
	}

	async fn call<T: serde::de::DeserializeOwned>(
		&self,
		chain_id: u64,
		method: &str,
		query: &[(&'static str, String)],
	) -> ProviderResult<T> {
		let client = self.cache.get_client(&self.client_config())?;
		let url = self.config.url(&format!("{}/{}", chain_id, method));
		get_json(&client, &self.config.name, &url, query, self.config.timeout_ms).await
	}
}

#[async_trait]
impl ProviderAdapter for OneInchAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn get_price(&self, request: &PriceRequest) -> ProviderResult<ProviderPriceQuote> {
		debug!(
			"1inch quote {} -> {} on chain {} via {}",
			request.sell_token, request.buy_token, request.chain_id, self.config.name
		);
		let response: OneInchQuoteResponse = self
			.call(request.chain_id, "quote", &quote_params(request))
			.await?;
		response.into_quote(&self.config.name, request)
	}

	async fn get_swap(
		&self,
		request: &PriceRequest,
		taker_address: &str,
	) -> ProviderResult<ProviderSwapQuote> {
		debug!(
			"1inch swap {} -> {} on chain {} for {}",
			request.sell_token, request.buy_token, request.chain_id, taker_address
		);
		let response: OneInchSwapResponse = self
			.call(request.chain_id, "swap", &swap_params(request, taker_address))
			.await?;
		response.into_swap(&self.config.name, request)
	}
}

pub(crate) fn quote_params(request: &PriceRequest) -> Vec<(&'static str, String)> {
	let mut params = vec![
		("src", request.sell_token.clone()),
		("dst", request.buy_token.clone()),
		("amount", request.sell_amount.to_string()),
		("includeGas", "true".to_string()),
		("includeProtocols", "true".to_string()),
	];
	if let Some(gas_price) = &request.gas_price {
		params.push(("gasPrice", gas_price.to_string()));
	}
	if let Some(fee) = request.buy_token_percentage_fee {
		params.push(("fee", format_decimal(fee * 100.0)));
	}
	params
}

pub(crate) fn swap_params(request: &PriceRequest, taker_address: &str) -> Vec<(&'static str, String)> {
	let mut params = quote_params(request);
	params.push(("from", taker_address.to_string()));
	params.push(("slippage", format_decimal(request.slippage_percentage * 100.0)));
	if let Some(recipient) = &request.fee_recipient {
		params.push(("referrer", recipient.clone()));
	}
	params
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OneInchQuoteResponse {
	#[serde(alias = "toAmount")]
	to_token_amount: U256,
	#[serde(default, alias = "fromAmount")]
	from_token_amount: Option<U256>,
	#[serde(default, alias = "gas", deserialize_with = "lenient_u64")]
	estimated_gas: u64,
	/// Routes, each a list of hops, each a list of protocol splits
	#[serde(default)]
	protocols: Vec<Vec<Vec<OneInchProtocolPart>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OneInchProtocolPart {
	name: String,
	/// Percentage of the hop routed through this protocol
	part: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OneInchSwapResponse {
	#[serde(flatten)]
	quote: OneInchQuoteResponse,
	tx: OneInchTransaction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OneInchTransaction {
	to: String,
	data: String,
	#[serde(default)]
	value: U256,
	gas_price: Option<U256>,
	#[serde(default, deserialize_with = "lenient_u64")]
	gas: u64,
}

impl OneInchQuoteResponse {
	pub(crate) fn into_quote(
		self,
		provider: &str,
		request: &PriceRequest,
	) -> ProviderResult<ProviderPriceQuote> {
		if self.to_token_amount.is_zero() {
			return Err(ProviderError::invalid_response(provider, "zero toTokenAmount"));
		}

		let sell_amount = self
			.from_token_amount
			.filter(|amount| !amount.is_zero())
			.unwrap_or_else(|| request.sell_amount.clone());

		Ok(
			ProviderPriceQuote::new(provider, self.to_token_amount, sell_amount, self.estimated_gas)
				.with_gas_price(request.gas_price.clone())
				.with_sources(first_hop_sources(&self.protocols)),
		)
	}
}

impl OneInchSwapResponse {
	pub(crate) fn into_swap(
		self,
		provider: &str,
		request: &PriceRequest,
	) -> ProviderResult<ProviderSwapQuote> {
		let tx = self.tx;
		if tx.to.is_empty() || tx.data.is_empty() {
			return Err(ProviderError::invalid_response(provider, "missing transaction target or data"));
		}

		let mut quote = self.quote.into_quote(provider, request)?;
		if tx.gas_price.is_some() {
			quote.gas_price = tx.gas_price;
		}
		let gas = if tx.gas == 0 { quote.estimated_gas } else { tx.gas };
		let router = tx.to.to_lowercase();

		Ok(ProviderSwapQuote {
			quote,
			allowance_target: router.clone(),
			to: router,
			data: tx.data,
			value: tx.value,
			gas,
		})
	}
}

/// Share of the sell amount per protocol, taken from each route's first hop
fn first_hop_sources(routes: &[Vec<Vec<OneInchProtocolPart>>]) -> Vec<LiquiditySource> {
	let mut shares: BTreeMap<&str, f64> = BTreeMap::new();
	for hop in routes.iter().filter_map(|route| route.first()) {
		for part in hop {
			*shares.entry(part.name.as_str()).or_default() += part.part / 100.0;
		}
	}

	shares
		.into_iter()
		.filter(|(_, proportion)| *proportion > 0.0)
		.map(|(name, proportion)| LiquiditySource::new(name, proportion))
		.collect()
}
