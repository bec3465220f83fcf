//! Price request model

use serde::{Deserialize, Serialize};

use super::errors::{ValidationError, ValidationResult};
use crate::U256;

/// Default slippage tolerance (0.5%)
pub const DEFAULT_SLIPPAGE_PERCENTAGE: f64 = 0.005;

/// A request for a swap price on one chain
///
/// Addresses are lower-cased by every constructor and builder method; the
/// quote cache and provider adapters rely on that normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
	pub chain_id: u64,
	pub buy_token: String,
	pub sell_token: String,
	/// Amount of `sell_token` in base units
	pub sell_amount: U256,
	/// Gas price in wei
	pub gas_price: Option<U256>,
	/// Slippage tolerance as a fraction (0.01 = 1%)
	#[serde(default = "default_slippage")]
	pub slippage_percentage: f64,
	pub taker_address: Option<String>,
	pub fee_recipient: Option<String>,
	/// Fee taken from the buy token as a fraction (0.01 = 1%)
	pub buy_token_percentage_fee: Option<f64>,
}

impl PriceRequest {
	pub fn new(
		chain_id: u64,
		buy_token: impl Into<String>,
		sell_token: impl Into<String>,
		sell_amount: impl Into<U256>,
	) -> Self {
		Self {
			chain_id,
			buy_token: normalize_address(buy_token.into()),
			sell_token: normalize_address(sell_token.into()),
			sell_amount: sell_amount.into(),
			gas_price: None,
			slippage_percentage: DEFAULT_SLIPPAGE_PERCENTAGE,
			taker_address: None,
			fee_recipient: None,
			buy_token_percentage_fee: None,
		}
	}

	pub fn with_gas_price(mut self, gas_price: impl Into<U256>) -> Self {
		self.gas_price = Some(gas_price.into());
		self
	}

	pub fn with_slippage(mut self, slippage_percentage: f64) -> Self {
		self.slippage_percentage = slippage_percentage;
		self
	}

	pub fn with_taker(mut self, taker_address: impl Into<String>) -> Self {
		self.taker_address = Some(normalize_address(taker_address.into()));
		self
	}

	pub fn with_fee_recipient(mut self, fee_recipient: impl Into<String>) -> Self {
		self.fee_recipient = Some(normalize_address(fee_recipient.into()));
		self
	}

	pub fn with_buy_token_percentage_fee(mut self, fee: f64) -> Self {
		self.buy_token_percentage_fee = Some(fee);
		self
	}

	/// Re-apply address normalization, for requests built field by field
	/// (deserialized payloads, struct literals).
	pub fn normalized(mut self) -> Self {
		self.buy_token = normalize_address(self.buy_token);
		self.sell_token = normalize_address(self.sell_token);
		self.taker_address = self.taker_address.map(normalize_address);
		self.fee_recipient = self.fee_recipient.map(normalize_address);
		self
	}

	/// Boundary validation; the aggregation core trusts requests that pass
	///
	/// Besides well-formedness, a swap of a token for itself and a fee
	/// outside `[0, 1)` are refused here rather than forwarded to providers.
	pub fn validate(&self) -> ValidationResult<()> {
		validate_address("buyToken", &self.buy_token)?;
		validate_address("sellToken", &self.sell_token)?;
		if self.buy_token == self.sell_token {
			return Err(ValidationError::SameToken {
				token: self.buy_token.clone(),
			});
		}

		if self.sell_amount.is_zero() {
			return Err(ValidationError::InvalidAmount {
				field: "sellAmount".to_string(),
				reason: "must be greater than zero".to_string(),
			});
		}

		if let Some(gas_price) = &self.gas_price {
			if gas_price.is_zero() {
				return Err(ValidationError::InvalidAmount {
					field: "gasPrice".to_string(),
					reason: "must be greater than zero".to_string(),
				});
			}
		}

		if !self.slippage_percentage.is_finite() || self.slippage_percentage < 0.0 {
			return Err(ValidationError::InvalidSlippage {
				value: self.slippage_percentage,
			});
		}

		if let Some(fee) = self.buy_token_percentage_fee {
			if !fee.is_finite() || !(0.0..1.0).contains(&fee) {
				return Err(ValidationError::InvalidFee { value: fee });
			}
		}

		if let Some(taker) = &self.taker_address {
			validate_address("takerAddress", taker)?;
		}
		if let Some(recipient) = &self.fee_recipient {
			validate_address("feeRecipient", recipient)?;
		}

		Ok(())
	}
}

fn default_slippage() -> f64 {
	DEFAULT_SLIPPAGE_PERCENTAGE
}

fn normalize_address(address: String) -> String {
	address.trim().to_lowercase()
}

fn validate_address(field: &str, address: &str) -> ValidationResult<()> {
	if address.is_empty() {
		return Err(ValidationError::MissingField {
			field: field.to_string(),
		});
	}

	let valid = address.len() == 42
		&& address.starts_with("0x")
		&& address[2..].chars().all(|c| c.is_ascii_hexdigit());
	if !valid {
		return Err(ValidationError::InvalidAddress {
			field: field.to_string(),
			value: address.to_string(),
		});
	}

	Ok(())
}
