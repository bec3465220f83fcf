//! Normalized provider quotes and aggregation results

use serde::{Deserialize, Serialize};

use crate::U256;

/// One liquidity source contributing to a provider's route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquiditySource {
	pub name: String,
	/// Share of the sell amount routed through this source (0.0 - 1.0)
	pub proportion: f64,
}

impl LiquiditySource {
	pub fn new(name: impl Into<String>, proportion: f64) -> Self {
		Self {
			name: name.into(),
			proportion,
		}
	}
}

/// A provider's price for one request, normalized to the shared model
///
/// `price` is always `buy_amount / sell_amount` in base units. `is_best` is
/// assigned by ranking and is never taken from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPriceQuote {
	pub provider: String,
	pub buy_amount: U256,
	pub sell_amount: U256,
	pub estimated_gas: u64,
	pub gas_price: Option<U256>,
	pub price: f64,
	pub is_best: bool,
	pub sources: Vec<LiquiditySource>,
}

impl ProviderPriceQuote {
	pub fn new(
		provider: impl Into<String>,
		buy_amount: U256,
		sell_amount: U256,
		estimated_gas: u64,
	) -> Self {
		let price = price_of(&buy_amount, &sell_amount);
		Self {
			provider: provider.into(),
			buy_amount,
			sell_amount,
			estimated_gas,
			gas_price: None,
			price,
			is_best: false,
			sources: Vec::new(),
		}
	}

	pub fn with_gas_price(mut self, gas_price: Option<U256>) -> Self {
		self.gas_price = gas_price;
		self
	}

	pub fn with_sources(mut self, sources: Vec<LiquiditySource>) -> Self {
		self.sources = sources;
		self
	}

	/// Copy of this quote with the best flag set as given; all other fields
	/// are untouched.
	pub fn marked(&self, is_best: bool) -> Self {
		Self {
			is_best,
			..self.clone()
		}
	}
}

/// Executable swap quote from exactly one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSwapQuote {
	#[serde(flatten)]
	pub quote: ProviderPriceQuote,
	/// Contract the taker must call
	pub to: String,
	/// ABI-encoded call data
	pub data: String,
	/// Native currency to attach, in wei
	pub value: U256,
	/// Address the sell token must be approved for
	pub allowance_target: String,
	/// Gas limit suggested by the provider
	pub gas: u64,
}

/// Counters describing how one aggregation went
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationMetadata {
	pub total_duration_ms: u64,
	pub providers_queried: usize,
	pub providers_succeeded: usize,
	pub providers_failed: usize,
	pub providers_timed_out: usize,
	pub from_cache: bool,
}

/// Ranked quotes for one request, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
	pub quotes: Vec<ProviderPriceQuote>,
	pub metadata: AggregationMetadata,
}

impl AggregationResult {
	pub fn new(quotes: Vec<ProviderPriceQuote>, metadata: AggregationMetadata) -> Self {
		Self { quotes, metadata }
	}

	/// The entry flagged best, if any
	pub fn best(&self) -> Option<&ProviderPriceQuote> {
		self.quotes.iter().find(|quote| quote.is_best)
	}

	pub fn is_empty(&self) -> bool {
		self.quotes.is_empty()
	}

	pub fn len(&self) -> usize {
		self.quotes.len()
	}

	/// Same result as served from the cache
	pub fn as_cached(&self) -> Self {
		let mut cached = self.clone();
		cached.metadata.from_cache = true;
		cached.metadata.total_duration_ms = 0;
		cached
	}
}

fn price_of(buy_amount: &U256, sell_amount: &U256) -> f64 {
	if sell_amount.is_zero() {
		return 0.0;
	}
	buy_amount.as_f64() / sell_amount.as_f64()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_price_is_buy_over_sell() {
		let quote = ProviderPriceQuote::new("zeroex", U256::from(2100u64), U256::from(1000u64), 150_000);
		assert!((quote.price - 2.1).abs() < f64::EPSILON);
		assert!(!quote.is_best);
	}

	#[test]
	fn test_marked_only_changes_flag() {
		let quote = ProviderPriceQuote::new("oneinch", U256::from(5u64), U256::from(10u64), 1)
			.with_sources(vec![LiquiditySource::new("Uniswap_V3", 1.0)]);
		let best = quote.marked(true);
		assert!(best.is_best);
		assert_eq!(best.marked(false), quote);
	}

	#[test]
	fn test_swap_quote_serializes_flat_camel_case() {
		let swap = ProviderSwapQuote {
			quote: ProviderPriceQuote::new("zeroex", U256::from(2u64), U256::from(1u64), 21_000),
			to: "0xdef1c0ded9bec7f1a1670819833240f027b25eff".to_string(),
			data: "0xd9627aa4".to_string(),
			value: U256::zero(),
			allowance_target: "0xdef1c0ded9bec7f1a1670819833240f027b25eff".to_string(),
			gas: 30_000,
		};
		let json = serde_json::to_value(&swap).unwrap();
		assert_eq!(json["provider"], "zeroex");
		assert_eq!(json["buyAmount"], "2");
		assert_eq!(json["allowanceTarget"], "0xdef1c0ded9bec7f1a1670819833240f027b25eff");
		assert_eq!(json["isBest"], false);
	}

	#[test]
	fn test_best_lookup() {
		let a = ProviderPriceQuote::new("a", U256::from(1u64), U256::from(1u64), 1);
		let b = ProviderPriceQuote::new("b", U256::from(2u64), U256::from(1u64), 1).marked(true);
		let result = AggregationResult::new(vec![b.clone(), a], AggregationMetadata::default());
		assert_eq!(result.best(), Some(&b));
		assert!(AggregationResult::default().best().is_none());
	}
}
