//! Validation errors raised at the request boundary

use thiserror::Error;

/// Reasons a [`PriceRequest`](super::PriceRequest) is rejected before any
/// provider is contacted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
	#[error("Missing required field: {field}")]
	MissingField { field: String },

	#[error("Invalid address for {field}: {value}")]
	InvalidAddress { field: String, value: String },

	#[error("Invalid amount for {field}: {reason}")]
	InvalidAmount { field: String, reason: String },

	#[error("Slippage percentage must be a non-negative number, got {value}")]
	InvalidSlippage { value: f64 },

	#[error("Buy token percentage fee must be within [0, 1), got {value}")]
	InvalidFee { value: f64 },

	#[error("Buy and sell token must differ: {token}")]
	SameToken { token: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;
