//! Short-lived cache of aggregated price results
//!
//! Entries expire lazily: a read past the TTL treats the entry as absent and
//! removes it. [`QuoteCache::cleanup_expired`] sweeps entries nobody reads again.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use meta_types::{AggregationResult, PriceRequest, U256};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tracing::debug;

/// Every input that can change a price result
///
/// Floats are keyed by bit pattern so that identical requests always hash
/// identically. Addresses are expected to be lower-cased already.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteCacheKey {
	chain_id: u64,
	buy_token: String,
	sell_token: String,
	sell_amount: U256,
	gas_price: Option<U256>,
	slippage_bits: u64,
	taker_address: Option<String>,
	fee_recipient: Option<String>,
	buy_token_percentage_fee_bits: Option<u64>,
	provider: Option<String>,
}

impl QuoteCacheKey {
	pub fn new(request: &PriceRequest, provider: Option<&str>) -> Self {
		Self {
			chain_id: request.chain_id,
			buy_token: request.buy_token.clone(),
			sell_token: request.sell_token.clone(),
			sell_amount: request.sell_amount.clone(),
			gas_price: request.gas_price.clone(),
			slippage_bits: request.slippage_percentage.to_bits(),
			taker_address: request.taker_address.clone(),
			fee_recipient: request.fee_recipient.clone(),
			buy_token_percentage_fee_bits: request.buy_token_percentage_fee.map(f64::to_bits),
			provider: provider.map(str::to_string),
		}
	}
}

#[derive(Debug)]
struct CacheEntry {
	value: Arc<AggregationResult>,
	created_at: Instant,
}

impl CacheEntry {
	fn is_fresh(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() < ttl
	}
}

/// Process-wide price cache; clones share storage
#[derive(Debug, Clone)]
pub struct QuoteCache {
	entries: Arc<DashMap<QuoteCacheKey, CacheEntry>>,
	ttl: Duration,
}

impl QuoteCache {
	pub fn new(ttl: Duration) -> Self {
		Self {
			entries: Arc::new(DashMap::new()),
			ttl,
		}
	}

	pub fn get(&self, key: &QuoteCacheKey) -> Option<Arc<AggregationResult>> {
		if let Some(entry) = self.entries.get(key) {
			if entry.is_fresh(self.ttl) {
				return Some(entry.value.clone());
			}
		}

		// Guard dropped above; re-check so a concurrent fresh put survives
		self.entries.remove_if(key, |_, entry| !entry.is_fresh(self.ttl));
		None
	}

	/// Store a result unless a fresh entry already exists for the key
	pub fn put(&self, key: QuoteCacheKey, value: Arc<AggregationResult>) {
		let ttl = self.ttl;
		match self.entries.entry(key) {
			Entry::Occupied(mut occupied) => {
				if !occupied.get().is_fresh(ttl) {
					occupied.insert(CacheEntry {
						value,
						created_at: Instant::now(),
					});
				}
			},
			Entry::Vacant(vacant) => {
				vacant.insert(CacheEntry {
					value,
					created_at: Instant::now(),
				});
			},
		}
	}

	/// Drop every expired entry, returning how many were removed
	pub fn cleanup_expired(&self) -> usize {
		let before = self.entries.len();
		self.entries.retain(|_, entry| entry.is_fresh(self.ttl));
		let removed = before.saturating_sub(self.entries.len());
		if removed > 0 {
			debug!("Removed {} expired price cache entries", removed);
		}
		removed
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
