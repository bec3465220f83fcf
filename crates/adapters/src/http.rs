//! Shared HTTP plumbing for REST-based provider adapters

use meta_types::{ProviderError, ProviderResult, SecretString};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;
use url::Url;

/// Connection settings for one provider on one chain
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
	/// Provider name as configured (`zeroex`, `oneinch`)
	pub name: String,
	/// Base URL; adapter paths are appended to it
	pub endpoint: Url,
	pub timeout_ms: u64,
	pub api_key: Option<SecretString>,
}

impl HttpProviderConfig {
	pub fn new(
		name: impl Into<String>,
		endpoint: &str,
		timeout_ms: u64,
	) -> Result<Self, url::ParseError> {
		Ok(Self {
			name: name.into(),
			endpoint: Url::parse(endpoint)?,
			timeout_ms,
			api_key: None,
		})
	}

	pub fn with_api_key(mut self, api_key: Option<SecretString>) -> Self {
		self.api_key = api_key;
		self
	}

	/// Endpoint with `path` appended, keeping any base path segments
	pub fn url(&self, path: &str) -> String {
		format!(
			"{}/{}",
			self.endpoint.as_str().trim_end_matches('/'),
			path.trim_start_matches('/')
		)
	}
}

/// Perform one GET and decode the JSON body
///
/// Non-success statuses are classified with
/// [`ProviderError::from_http_failure`]; transport failures are mapped by
/// [`map_transport_error`].
pub async fn get_json<T: DeserializeOwned>(
	client: &Client,
	provider: &str,
	url: &str,
	query: &[(&'static str, String)],
	timeout_ms: u64,
) -> ProviderResult<T> {
	debug!("GET {} ({} params) for {}", url, query.len(), provider);

	let response = client
		.get(url)
		.query(query)
		.send()
		.await
		.map_err(|e| map_transport_error(provider, timeout_ms, e))?;

	let status = response.status();
	let body = response
		.text()
		.await
		.map_err(|e| map_transport_error(provider, timeout_ms, e))?;

	if !status.is_success() {
		return Err(match ProviderError::from_http_failure(provider, status.as_u16(), &body) {
			ProviderError::Timeout { provider, .. } => ProviderError::Timeout {
				provider,
				timeout_ms,
			},
			other => other,
		});
	}

	serde_json::from_str(&body)
		.map_err(|e| ProviderError::invalid_response(provider, format!("undecodable body: {}", e)))
}

pub fn map_transport_error(provider: &str, timeout_ms: u64, error: reqwest::Error) -> ProviderError {
	if error.is_timeout() {
		ProviderError::Timeout {
			provider: provider.to_string(),
			timeout_ms,
		}
	} else if error.is_decode() {
		ProviderError::invalid_response(provider, error.to_string())
	} else {
		ProviderError::unavailable(provider, error.to_string())
	}
}

/// Integers that providers send either as JSON numbers or as strings
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(u64),
		Text(String),
	}

	match Raw::deserialize(deserializer)? {
		Raw::Number(value) => Ok(value),
		Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
	}
}

/// Floats that providers send either as JSON numbers or as strings
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(f64),
		Text(String),
	}

	match Raw::deserialize(deserializer)? {
		Raw::Number(value) => Ok(value),
		Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
	}
}

/// Render a fraction for a query string without float noise
pub(crate) fn format_decimal(value: f64) -> String {
	let rendered = format!("{:.10}", value);
	let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
	if trimmed.is_empty() || trimmed == "-" {
		"0".to_string()
	} else {
		trimmed.to_string()
	}
}
