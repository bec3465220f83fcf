//! Shared handler plumbing: error bodies, status mapping, query parsing

use axum::{
	extract::rejection::{PathRejection, QueryRejection},
	http::StatusCode,
	Json,
};
use meta_service::AggregatorServiceError;
use meta_types::{PriceRequest, ProviderErrorKind, ValidationError, U256};
use serde::{Deserialize, Serialize};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Error response format shared by handlers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
	pub timestamp: i64,
}

impl ErrorResponse {
	pub fn new(error: &str, message: impl Into<String>) -> Self {
		Self {
			error: error.to_string(),
			message: message.into(),
			timestamp: chrono::Utc::now().timestamp(),
		}
	}
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
	(status, Json(ErrorResponse::new(error, message)))
}

pub fn validation_error(message: impl Into<String>) -> ApiError {
	api_error(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
}

impl From<ValidationError> for ErrorResponse {
	fn from(error: ValidationError) -> Self {
		Self::new("VALIDATION_ERROR", error.to_string())
	}
}

/// Map a service failure onto the HTTP surface
pub fn service_error(error: AggregatorServiceError) -> ApiError {
	let message = error.to_string();
	match error {
		AggregatorServiceError::UnsupportedChain { .. } => {
			api_error(StatusCode::NOT_FOUND, "UNSUPPORTED_CHAIN", message)
		},
		AggregatorServiceError::UnsupportedProvider { .. } => {
			api_error(StatusCode::NOT_FOUND, "UNSUPPORTED_PROVIDER", message)
		},
		AggregatorServiceError::NoQuotesAvailable { .. } => {
			api_error(StatusCode::NOT_FOUND, "NO_QUOTES_AVAILABLE", message)
		},
		AggregatorServiceError::Provider(provider_error) => match provider_error.kind() {
			ProviderErrorKind::Timeout => {
				api_error(StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT", message)
			},
			ProviderErrorKind::RateLimited => {
				api_error(StatusCode::TOO_MANY_REQUESTS, "PROVIDER_RATE_LIMITED", message)
			},
			ProviderErrorKind::Unavailable => {
				api_error(StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_UNAVAILABLE", message)
			},
			ProviderErrorKind::InvalidResponse => {
				api_error(StatusCode::BAD_GATEWAY, "PROVIDER_INVALID_RESPONSE", message)
			},
			ProviderErrorKind::InsufficientLiquidity => {
				api_error(StatusCode::BAD_REQUEST, "INSUFFICIENT_LIQUIDITY", message)
			},
		},
		AggregatorServiceError::Validation(_) => validation_error(message),
		AggregatorServiceError::Cancelled => {
			api_error(StatusCode::SERVICE_UNAVAILABLE, "REQUEST_CANCELLED", message)
		},
		AggregatorServiceError::Registry(_) => {
			api_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
		},
	}
}

/// Query parameters shared by the price and quote routes
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
	pub buy_token: String,
	pub sell_token: String,
	pub sell_amount: String,
	pub gas_price: Option<String>,
	pub slippage_percentage: Option<f64>,
	pub taker_address: Option<String>,
	pub fee_recipient: Option<String>,
	pub buy_token_percentage_fee: Option<f64>,
	pub provider: Option<String>,
}

impl PriceQuery {
	/// Build and validate the domain request for `chain_id`
	pub fn into_request(self, chain_id: u64) -> Result<PriceRequest, ApiError> {
		let sell_amount = U256::parse(&self.sell_amount)
			.map_err(|reason| validation_error(format!("Invalid sellAmount: {}", reason)))?;

		let mut request = PriceRequest::new(chain_id, self.buy_token, self.sell_token, sell_amount);
		if let Some(gas_price) = self.gas_price {
			let gas_price = U256::parse(&gas_price)
				.map_err(|reason| validation_error(format!("Invalid gasPrice: {}", reason)))?;
			request = request.with_gas_price(gas_price);
		}
		if let Some(slippage) = self.slippage_percentage {
			request = request.with_slippage(slippage);
		}
		if let Some(taker) = self.taker_address {
			request = request.with_taker(taker);
		}
		if let Some(recipient) = self.fee_recipient {
			request = request.with_fee_recipient(recipient);
		}
		if let Some(fee) = self.buy_token_percentage_fee {
			request = request.with_buy_token_percentage_fee(fee);
		}

		request
			.validate()
			.map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorResponse::from(e))))?;
		Ok(request)
	}
}

/// Unwrap extractor results, turning rejections into validation errors
pub fn parse_inputs<P, Q>(
	path: Result<P, PathRejection>,
	query: Result<Q, QueryRejection>,
) -> Result<(P, Q), ApiError> {
	let path = path.map_err(|e| validation_error(e.body_text()))?;
	let query = query.map_err(|e| validation_error(e.body_text()))?;
	Ok((path, query))
}

/// Token cancelled when the returned guard drops, i.e. when the handler
/// future is dropped because the client went away
pub fn request_cancellation() -> (CancellationToken, DropGuard) {
	let token = CancellationToken::new();
	let guard = token.clone().drop_guard();
	(token, guard)
}

#[cfg(test)]
mod tests {
	use super::*;
	use meta_types::ProviderError;

	fn query() -> PriceQuery {
		PriceQuery {
			buy_token: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
			sell_token: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string(),
			sell_amount: "1000000000000000000".to_string(),
			gas_price: None,
			slippage_percentage: None,
			taker_address: None,
			fee_recipient: None,
			buy_token_percentage_fee: None,
			provider: None,
		}
	}

	#[test]
	fn test_query_into_request() {
		let request = PriceQuery {
			gas_price: Some("30000000000".to_string()),
			slippage_percentage: Some(0.01),
			..query()
		}
		.into_request(1)
		.unwrap();

		assert_eq!(request.buy_token, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
		assert_eq!(request.gas_price, Some(U256::from(30_000_000_000u64)));
		assert_eq!(request.slippage_percentage, 0.01);
	}

	#[test]
	fn test_invalid_amounts_are_validation_errors() {
		let (status, body) = PriceQuery {
			sell_amount: "0".to_string(),
			..query()
		}
		.into_request(1)
		.unwrap_err();
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
		assert_eq!(body.error, "VALIDATION_ERROR");

		let (status, _) = PriceQuery {
			sell_amount: "1e18".to_string(),
			..query()
		}
		.into_request(1)
		.unwrap_err();
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

		let (status, _) = PriceQuery {
			gas_price: Some("0".to_string()),
			..query()
		}
		.into_request(1)
		.unwrap_err();
		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	}

	#[test]
	fn test_provider_error_status_mapping() {
		let cases = [
			(
				ProviderError::Timeout {
					provider: "zeroex".to_string(),
					timeout_ms: 3000,
				},
				StatusCode::GATEWAY_TIMEOUT,
			),
			(
				ProviderError::RateLimited {
					provider: "zeroex".to_string(),
				},
				StatusCode::TOO_MANY_REQUESTS,
			),
			(ProviderError::unavailable("zeroex", "down"), StatusCode::SERVICE_UNAVAILABLE),
			(ProviderError::invalid_response("zeroex", "bad"), StatusCode::BAD_GATEWAY),
			(
				ProviderError::InsufficientLiquidity {
					provider: "zeroex".to_string(),
					reason: "no route".to_string(),
				},
				StatusCode::BAD_REQUEST,
			),
		];

		for (error, expected) in cases {
			let (status, _) = service_error(AggregatorServiceError::Provider(error));
			assert_eq!(status, expected);
		}
	}

	#[test]
	fn test_unsupported_lookups_are_not_found() {
		let (status, Json(body)) =
			service_error(AggregatorServiceError::UnsupportedChain { chain_id: 10 });
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body.error, "UNSUPPORTED_CHAIN");

		let (status, Json(body)) = service_error(AggregatorServiceError::UnsupportedProvider {
			provider: "paraswap".to_string(),
			chain_id: 1,
		});
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body.error, "UNSUPPORTED_PROVIDER");
	}

	#[test]
	fn test_request_cancellation_guard() {
		let (token, guard) = request_cancellation();
		assert!(!token.is_cancelled());
		drop(guard);
		assert!(token.is_cancelled());
	}
}
