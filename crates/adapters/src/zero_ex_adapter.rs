//! 0x Swap API v1 adapter
//!
//! `GET {endpoint}/swap/v1/price` for indicative prices and
//! `GET {endpoint}/swap/v1/quote` for executable swaps. 0x serves each chain
//! from its own host, so one adapter instance is built per chain endpoint.

use async_trait::async_trait;
use meta_types::{
	LiquiditySource, PriceRequest, ProviderAdapter, ProviderError, ProviderInfo,
	ProviderPriceQuote, ProviderResult, ProviderSwapQuote, U256,
};
use serde::Deserialize;
use tracing::debug;

use crate::client_cache::{ClientCache, ClientConfig};
use crate::http::{format_decimal, get_json, lenient_f64, lenient_u64, HttpProviderConfig};

const API_KEY_HEADER: &str = "0x-api-key";

/// Adapter for the 0x Swap API
#[derive(Debug)]
pub struct ZeroExAdapter {
	info: ProviderInfo,
	config: HttpProviderConfig,
	cache: ClientCache,
}

impl ZeroExAdapter {
	pub fn new(config: HttpProviderConfig) -> Self {
		Self::with_cache(config, ClientCache::new())
	}

	/// Share HTTP clients with other adapters built from the same settings
	pub fn with_cache(config: HttpProviderConfig, cache: ClientCache) -> Self {
		Self {
			info: ProviderInfo::new(config.name.clone(), "0x", "swap/v1"),
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
			Some(key) => client_config.with_header(API_KEY_HEADER, key.expose_secret()),
			None => client_config,
		}
	}

	async fn call<T: serde::de::DeserializeOwned>(
		&self,
		path: &str,
		query: &[(&'static str, String)],
	) -> ProviderResult<T> {
		let client = self.cache.get_client(&self.client_config())?;
		get_json(
			&client,
			&self.config.name,
			&self.config.url(path),
			query,
			self.config.timeout_ms,
		)
		.await
	}
}

#[async_trait]
impl ProviderAdapter for ZeroExAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn get_price(&self, request: &PriceRequest) -> ProviderResult<ProviderPriceQuote> {
		debug!(
			"0x price {} -> {} on chain {} via {}",
			request.sell_token, request.buy_token, request.chain_id, self.config.name
		);
		let response: ZeroExPriceResponse = self
			.call("swap/v1/price", &query_params(request, request.taker_address.as_deref()))
			.await?;
		response.into_quote(&self.config.name, request)
	}

	async fn get_swap(
		&self,
		request: &PriceRequest,
		taker_address: &str,
	) -> ProviderResult<ProviderSwapQuote> {
		debug!(
			"0x swap {} -> {} on chain {} for {}",
			request.sell_token, request.buy_token, request.chain_id, taker_address
		);
		let response: ZeroExQuoteResponse = self
			.call("swap/v1/quote", &query_params(request, Some(taker_address)))
			.await?;
		response.into_swap(&self.config.name, request)
	}
}

/// Native 0x parameter names; slippage and fee stay fractions
pub(crate) fn query_params(
	request: &PriceRequest,
	taker_address: Option<&str>,
) -> Vec<(&'static str, String)> {
	let mut params = vec![
		("buyToken", request.buy_token.clone()),
		("sellToken", request.sell_token.clone()),
		("sellAmount", request.sell_amount.to_string()),
		("slippagePercentage", format_decimal(request.slippage_percentage)),
	];
	if let Some(gas_price) = &request.gas_price {
		params.push(("gasPrice", gas_price.to_string()));
	}
	if let Some(taker) = taker_address {
		params.push(("takerAddress", taker.to_string()));
	}
	if let Some(recipient) = &request.fee_recipient {
		params.push(("feeRecipient", recipient.clone()));
	}
	if let Some(fee) = request.buy_token_percentage_fee {
		params.push(("buyTokenPercentageFee", format_decimal(fee)));
	}
	params
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZeroExPriceResponse {
	buy_amount: U256,
	sell_amount: U256,
	#[serde(default, deserialize_with = "lenient_u64")]
	estimated_gas: u64,
	gas_price: Option<U256>,
	#[serde(default)]
	sources: Vec<ZeroExSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ZeroExSource {
	name: String,
	#[serde(deserialize_with = "lenient_f64")]
	proportion: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZeroExQuoteResponse {
	#[serde(flatten)]
	price: ZeroExPriceResponse,
	to: String,
	data: String,
	#[serde(default)]
	value: U256,
	allowance_target: Option<String>,
	#[serde(default, deserialize_with = "lenient_u64")]
	gas: u64,
}

impl ZeroExPriceResponse {
	pub(crate) fn into_quote(
		self,
		provider: &str,
		request: &PriceRequest,
	) -> ProviderResult<ProviderPriceQuote> {
		if self.buy_amount.is_zero() {
			return Err(ProviderError::invalid_response(provider, "zero buyAmount"));
		}

		// 0x lists every known source, most with a zero proportion
		let sources = self
			.sources
			.into_iter()
			.filter(|source| source.proportion > 0.0)
			.map(|source| LiquiditySource::new(source.name, source.proportion))
			.collect();

		let sell_amount = if self.sell_amount.is_zero() {
			request.sell_amount.clone()
		} else {
			self.sell_amount
		};

		Ok(ProviderPriceQuote::new(provider, self.buy_amount, sell_amount, self.estimated_gas)
			.with_gas_price(self.gas_price.or_else(|| request.gas_price.clone()))
			.with_sources(sources))
	}
}

impl ZeroExQuoteResponse {
	pub(crate) fn into_swap(
		self,
		provider: &str,
		request: &PriceRequest,
	) -> ProviderResult<ProviderSwapQuote> {
		if self.to.is_empty() || self.data.is_empty() {
			return Err(ProviderError::invalid_response(provider, "missing transaction target or data"));
		}

		let allowance_target = self.allowance_target.unwrap_or_else(|| self.to.clone());
		let gas = if self.gas == 0 {
			self.price.estimated_gas
		} else {
			self.gas
		};

		Ok(ProviderSwapQuote {
			quote: self.price.into_quote(provider, request)?,
			to: self.to.to_lowercase(),
			data: self.data,
			value: self.value,
			allowance_target: allowance_target.to_lowercase(),
			gas,
		})
	}
}
