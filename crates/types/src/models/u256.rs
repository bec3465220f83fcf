//! Arbitrary-precision token amounts kept as canonical decimal strings

use std::cmp::Ordering;

/// Unsigned token amount in base units (wei and friends)
///
/// Stored as a decimal string without leading zeros so that amounts larger
/// than any native integer survive a round trip through provider APIs.
/// Equality, hashing and ordering all follow the numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct U256(String);

impl U256 {
	/// Create a new amount, canonicalizing leading zeros
	///
	/// Callers are expected to pass digits only; use [`U256::parse`] for
	/// untrusted input.
	pub fn new(value: impl Into<String>) -> Self {
		let value = value.into();
		let trimmed = value.trim_start_matches('0');
		if trimmed.is_empty() {
			Self("0".to_string())
		} else {
			Self(trimmed.to_string())
		}
	}

	/// Parse and validate an untrusted decimal string
	pub fn parse(value: &str) -> Result<Self, String> {
		let value = value.trim();
		if value.is_empty() {
			return Err("amount cannot be empty".to_string());
		}
		if !value.chars().all(|c| c.is_ascii_digit()) {
			return Err(format!("amount '{}' must contain only digits", value));
		}
		Ok(Self::new(value))
	}

	pub fn zero() -> Self {
		Self("0".to_string())
	}

	/// Get the raw string value
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Try to parse as u128 (for smaller values)
	pub fn as_u128(&self) -> Result<u128, std::num::ParseIntError> {
		self.0.parse()
	}

	/// Lossy floating point view, used for display prices only
	pub fn as_f64(&self) -> f64 {
		self.0.parse().unwrap_or(f64::NAN)
	}

	pub fn is_zero(&self) -> bool {
		self.0 == "0"
	}
}

impl Ord for U256 {
	fn cmp(&self, other: &Self) -> Ordering {
		// Canonical form has no leading zeros, so longer means larger
		self.0
			.len()
			.cmp(&other.0.len())
			.then_with(|| self.0.cmp(&other.0))
	}
}

impl PartialOrd for U256 {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Default for U256 {
	fn default() -> Self {
		Self::zero()
	}
}

impl std::fmt::Display for U256 {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for U256 {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl From<&str> for U256 {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for U256 {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<u128> for U256 {
	fn from(value: u128) -> Self {
		Self(value.to_string())
	}
}

impl From<u64> for U256 {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}

// Serialized as a string; providers disagree on whether amounts are JSON
// numbers or strings, so both are accepted on the way in.
impl serde::Serialize for U256 {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> serde::Deserialize<'de> for U256 {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		#[derive(serde::Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Text(String),
			Number(u64),
		}

		match Raw::deserialize(deserializer)? {
			Raw::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
			Raw::Number(number) => Ok(Self::from(number)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_u256_canonicalizes_leading_zeros() {
		assert_eq!(U256::new("000123"), U256::new("123"));
		assert_eq!(U256::new("0000").as_str(), "0");
		assert!(U256::new("").is_zero());
	}

	#[test]
	fn test_u256_numeric_ordering() {
		assert!(U256::new("2100") > U256::new("2000"));
		assert!(U256::new("10") > U256::new("9"));
		assert!(U256::new("1000000000000000000000000000000000000000000")
			> U256::new("999999999999999999999999999999999999999999"));
		assert_eq!(U256::new("42").cmp(&U256::new("042")), Ordering::Equal);
	}

	#[test]
	fn test_u256_parse_rejects_non_digits() {
		assert!(U256::parse("12a").is_err());
		assert!(U256::parse("").is_err());
		assert!(U256::parse("-1").is_err());
		assert_eq!(U256::parse(" 77 ").unwrap().as_str(), "77");
	}

	#[test]
	fn test_u256_serde_accepts_strings_and_numbers() {
		let from_text: U256 = serde_json::from_str("\"1000000000000000000\"").unwrap();
		let from_number: U256 = serde_json::from_str("21000").unwrap();
		assert_eq!(from_text.as_u128().unwrap(), 1_000_000_000_000_000_000u128);
		assert_eq!(from_number, U256::from(21000u64));
		assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"21000\"");
		assert!(serde_json::from_str::<U256>("\"0x10\"").is_err());
	}
}
