//! Mock provider adapters with call tracking, delays and failure knobs

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use meta_aggregator::models::{
	LiquiditySource, PriceRequest, ProviderAdapter, ProviderError, ProviderInfo,
	ProviderPriceQuote, ProviderResult, ProviderSwapQuote, U256,
};

pub const ROUTER_ADDRESS: &str = "0xdef1c0ded9bec7f1a1670819833240f027b25eff";

/// Mock provider
///
/// Returns `sell_amount * buy_per_sell` as the buy amount, after an optional
/// delay. Clones share the call counter.
#[derive(Debug, Clone)]
pub struct MockAdapter {
	info: ProviderInfo,
	call_tracker: Arc<AtomicUsize>,
	pub buy_per_sell: u64,
	pub estimated_gas: u64,
	pub failure: Option<ProviderError>,
	pub response_delay_ms: u64,
}

impl MockAdapter {
	pub fn new(name: &str, buy_per_sell: u64) -> Self {
		Self {
			info: ProviderInfo::new(name, format!("Mock {}", name), "1.0.0"),
			call_tracker: Arc::new(AtomicUsize::new(0)),
			buy_per_sell,
			estimated_gas: 150_000,
			failure: None,
			response_delay_ms: 0,
		}
	}

	/// Responds after `delay_ms`
	pub fn slow(name: &str, buy_per_sell: u64, delay_ms: u64) -> Self {
		Self {
			response_delay_ms: delay_ms,
			..Self::new(name, buy_per_sell)
		}
	}

	/// Always fails as unavailable
	pub fn failing(name: &str) -> Self {
		Self::new(name, 0).with_failure(ProviderError::unavailable(name, "connection refused"))
	}

	pub fn with_failure(mut self, failure: ProviderError) -> Self {
		self.failure = Some(failure);
		self
	}

	pub fn with_gas(mut self, estimated_gas: u64) -> Self {
		self.estimated_gas = estimated_gas;
		self
	}

	pub fn call_count(&self) -> usize {
		self.call_tracker.load(Ordering::SeqCst)
	}

	pub fn shared(&self) -> Arc<dyn ProviderAdapter> {
		Arc::new(self.clone())
	}

	async fn respond(&self, request: &PriceRequest) -> ProviderResult<ProviderPriceQuote> {
		self.call_tracker.fetch_add(1, Ordering::SeqCst);

		if self.response_delay_ms > 0 {
			tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
		}

		if let Some(failure) = &self.failure {
			return Err(failure.clone());
		}

		let sell_amount = request.sell_amount.as_u128().unwrap_or(u128::MAX);
		let buy_amount = U256::from(sell_amount.saturating_mul(self.buy_per_sell as u128));
		Ok(ProviderPriceQuote::new(
			self.info.name.clone(),
			buy_amount,
			request.sell_amount.clone(),
			self.estimated_gas,
		)
		.with_gas_price(request.gas_price.clone())
		.with_sources(vec![LiquiditySource::new("Uniswap_V3", 1.0)]))
	}
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
	fn provider_info(&self) -> &ProviderInfo {
		&self.info
	}

	async fn get_price(&self, request: &PriceRequest) -> ProviderResult<ProviderPriceQuote> {
		self.respond(request).await
	}

	async fn get_swap(
		&self,
		request: &PriceRequest,
		_taker_address: &str,
	) -> ProviderResult<ProviderSwapQuote> {
		let quote = self.respond(request).await?;
		Ok(ProviderSwapQuote {
			gas: quote.estimated_gas + 20_000,
			quote,
			to: ROUTER_ADDRESS.to_string(),
			data: "0xd9627aa4".to_string(),
			value: U256::zero(),
			allowance_target: ROUTER_ADDRESS.to_string(),
		})
	}
}
