//! Ordering of provider quotes and best-quote selection

use meta_types::ProviderPriceQuote;
use std::cmp::Ordering;

/// Total order over quotes for one request; `Less` means `a` ranks higher
pub trait RankingPolicy: Send + Sync + std::fmt::Debug {
	fn compare(&self, a: &ProviderPriceQuote, b: &ProviderPriceQuote) -> Ordering;
}

/// Most tokens out first, then cheapest gas, then a fixed provider order
///
/// Quotes for the same sell amount compare by exact `buy_amount`; otherwise
/// by `price`. Providers missing from the preference list rank after listed
/// ones, alphabetically.
#[derive(Debug, Clone, Default)]
pub struct BestAmountPolicy {
	provider_preference: Vec<String>,
}

impl BestAmountPolicy {
	pub fn new(provider_preference: Vec<String>) -> Self {
		Self {
			provider_preference,
		}
	}

	fn preference_rank(&self, provider: &str) -> usize {
		self.provider_preference
			.iter()
			.position(|preferred| preferred == provider)
			.unwrap_or(self.provider_preference.len())
	}
}

impl RankingPolicy for BestAmountPolicy {
	fn compare(&self, a: &ProviderPriceQuote, b: &ProviderPriceQuote) -> Ordering {
		let output = if a.sell_amount == b.sell_amount {
			b.buy_amount.cmp(&a.buy_amount)
		} else {
			b.price.total_cmp(&a.price)
		};

		output
			.then_with(|| a.estimated_gas.cmp(&b.estimated_gas))
			.then_with(|| {
				self.preference_rank(&a.provider)
					.cmp(&self.preference_rank(&b.provider))
			})
			.then_with(|| a.provider.cmp(&b.provider))
	}
}

/// Sort best first and flag exactly the first entry as best
///
/// Returns new values; inputs are not modified and no field other than
/// `is_best` differs from the input quotes.
pub fn rank(policy: &dyn RankingPolicy, quotes: &[ProviderPriceQuote]) -> Vec<ProviderPriceQuote> {
	let mut ranked: Vec<&ProviderPriceQuote> = quotes.iter().collect();
	ranked.sort_by(|a, b| policy.compare(a, b));
	ranked
		.into_iter()
		.enumerate()
		.map(|(position, quote)| quote.marked(position == 0))
		.collect()
}
