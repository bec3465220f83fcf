//! Meta Aggregator Types
//!
//! Shared models and traits for the meta aggregator.
//! Organized by business entity: price requests and quotes, providers,
//! and the primitive models both build on.

pub mod models;
pub mod providers;
pub mod quotes;

pub use serde_json;

pub use models::{SecretString, U256};

pub use quotes::{
	AggregationMetadata, AggregationResult, LiquiditySource, PriceRequest, ProviderPriceQuote,
	ProviderSwapQuote, ValidationError, ValidationResult,
};

pub use providers::{
	ProviderAdapter, ProviderError, ProviderErrorKind, ProviderInfo, ProviderResult,
};
