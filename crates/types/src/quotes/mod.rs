//! Price requests, provider quotes and aggregation results

pub mod errors;
pub mod request;
pub mod response;

pub use errors::{ValidationError, ValidationResult};
pub use request::PriceRequest;
pub use response::{
	AggregationMetadata, AggregationResult, LiquiditySource, ProviderPriceQuote, ProviderSwapQuote,
};
