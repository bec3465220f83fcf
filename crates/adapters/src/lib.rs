//! Meta Aggregator Adapters
//!
//! HTTP adapters for the supported liquidity providers and the per-chain
//! registry that owns them.

pub mod client_cache;
pub mod http;
pub mod one_inch_adapter;
pub mod registry;
pub mod zero_ex_adapter;

pub use client_cache::{ClientCache, ClientConfig};
pub use http::HttpProviderConfig;
pub use meta_types::{ProviderAdapter, ProviderError, ProviderResult};
pub use one_inch_adapter::OneInchAdapter;
pub use registry::{ProviderRegistry, RegistryError};
pub use zero_ex_adapter::ZeroExAdapter;
