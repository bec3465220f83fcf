//! Error types for provider operations

use thiserror::Error;

/// Failure of a single provider call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
	#[error("Provider {provider} timed out after {timeout_ms}ms")]
	Timeout { provider: String, timeout_ms: u64 },

	#[error("Rate limit exceeded for provider {provider}")]
	RateLimited { provider: String },

	#[error("Invalid response from provider {provider}: {reason}")]
	InvalidResponse { provider: String, reason: String },

	#[error("Provider {provider} is unavailable: {reason}")]
	Unavailable { provider: String, reason: String },

	#[error("Insufficient liquidity at provider {provider}: {reason}")]
	InsufficientLiquidity { provider: String, reason: String },
}

/// Classification of a [`ProviderError`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
	Timeout,
	RateLimited,
	InvalidResponse,
	Unavailable,
	InsufficientLiquidity,
}

impl ProviderError {
	pub fn kind(&self) -> ProviderErrorKind {
		match self {
			Self::Timeout { .. } => ProviderErrorKind::Timeout,
			Self::RateLimited { .. } => ProviderErrorKind::RateLimited,
			Self::InvalidResponse { .. } => ProviderErrorKind::InvalidResponse,
			Self::Unavailable { .. } => ProviderErrorKind::Unavailable,
			Self::InsufficientLiquidity { .. } => ProviderErrorKind::InsufficientLiquidity,
		}
	}

	/// Name of the provider that failed
	pub fn provider(&self) -> &str {
		match self {
			Self::Timeout { provider, .. }
			| Self::RateLimited { provider }
			| Self::InvalidResponse { provider, .. }
			| Self::Unavailable { provider, .. }
			| Self::InsufficientLiquidity { provider, .. } => provider,
		}
	}

	pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidResponse {
			provider: provider.into(),
			reason: reason.into(),
		}
	}

	pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Unavailable {
			provider: provider.into(),
			reason: reason.into(),
		}
	}

	/// Classify a non-success HTTP status returned by a provider
	///
	/// `body` is the (possibly empty) response text; providers report
	/// liquidity shortfalls as client errors with a descriptive body.
	pub fn from_http_failure(provider: impl Into<String>, status_code: u16, body: &str) -> Self {
		let provider = provider.into();
		match status_code {
			429 => Self::RateLimited { provider },
			408 | 504 => Self::Timeout {
				provider,
				timeout_ms: 0,
			},
			400..=499 if mentions_liquidity(body) => Self::InsufficientLiquidity {
				provider,
				reason: summarize(body),
			},
			500..=599 => Self::Unavailable {
				provider,
				reason: format!("HTTP {}: {}", status_code, summarize(body)),
			},
			_ => Self::InvalidResponse {
				provider,
				reason: format!("HTTP {}: {}", status_code, summarize(body)),
			},
		}
	}
}

fn mentions_liquidity(body: &str) -> bool {
	body.to_ascii_lowercase().contains("liquidity")
}

fn summarize(body: &str) -> String {
	const MAX_LEN: usize = 200;
	let body = body.trim();
	if body.is_empty() {
		return "empty response body".to_string();
	}
	body.chars().take(MAX_LEN).collect()
}
