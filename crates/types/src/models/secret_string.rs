//! Secret values (provider API keys, bearer tokens) that must never reach logs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// String wrapper that redacts itself in `Debug`, `Display` and serialized
/// output, and zeroizes its buffer on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
	inner: String,
}

impl SecretString {
	pub fn new(secret: String) -> Self {
		Self { inner: secret }
	}

	/// Expose the secret value
	///
	/// Only call this at the point the value is handed to a transport
	/// (an HTTP header) or compared against a presented credential.
	pub fn expose_secret(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Compare against a presented credential without short-circuiting on
	/// the first differing byte.
	pub fn matches(&self, candidate: &str) -> bool {
		let expected = self.inner.as_bytes();
		let candidate = candidate.as_bytes();
		if expected.len() != candidate.len() {
			return false;
		}
		expected
			.iter()
			.zip(candidate)
			.fold(0u8, |acc, (a, b)| acc | (a ^ b))
			== 0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString([REDACTED])")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

impl From<String> for SecretString {
	fn from(secret: String) -> Self {
		Self::new(secret)
	}
}

impl From<&str> for SecretString {
	fn from(secret: &str) -> Self {
		Self::new(secret.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(Self::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_secret_is_redacted() {
		let secret = SecretString::from("0x-api-key-123");
		assert_eq!(format!("{}", secret), "[REDACTED]");
		assert!(!format!("{:?}", secret).contains("api-key"));
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");
		assert_eq!(secret.expose_secret(), "0x-api-key-123");
	}

	#[test]
	fn test_secret_matches() {
		let secret = SecretString::from("token-abc");
		assert!(secret.matches("token-abc"));
		assert!(!secret.matches("token-abd"));
		assert!(!secret.matches("token-ab"));
	}
}
