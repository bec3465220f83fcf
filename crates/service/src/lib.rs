//! Meta Aggregator Service
//!
//! Concurrent price aggregation, ranking and the price cache.

pub mod aggregator;
pub mod quote_cache;
pub mod ranking;

pub use aggregator::{AggregatorResult, AggregatorService, AggregatorServiceError};
pub use quote_cache::{QuoteCache, QuoteCacheKey};
pub use ranking::{rank, BestAmountPolicy, RankingPolicy};
