//! Core provider adapter trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::{ProviderInfo, ProviderResult};
use crate::{PriceRequest, ProviderPriceQuote, ProviderSwapQuote};

/// Interface every liquidity provider integration implements
///
/// An adapter maps the shared [`PriceRequest`] onto its provider's native
/// parameters, performs exactly one outbound call per invocation, and
/// translates the native response (or failure) into the shared model.
/// Adapters enforce their own per-call timeout and never retry.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + Debug {
	/// Get provider metadata
	fn provider_info(&self) -> &ProviderInfo;

	/// Get provider name (for registry lookups and quote attribution)
	fn name(&self) -> &str {
		&self.provider_info().name
	}

	/// Indicative price, no executable payload
	async fn get_price(&self, request: &PriceRequest) -> ProviderResult<ProviderPriceQuote>;

	/// Executable swap for `taker_address`
	async fn get_swap(
		&self,
		request: &PriceRequest,
		taker_address: &str,
	) -> ProviderResult<ProviderSwapQuote>;
}
