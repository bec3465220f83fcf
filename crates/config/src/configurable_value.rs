//! Secrets in configuration: either a literal or the name of an environment variable

use meta_types::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configured secret such as a provider API key or an API bearer token
///
/// Accepts two shapes in configuration files:
///
/// ```toml
/// api_key = "env:ZEROEX_API_KEY"                       # shorthand
/// api_key = { type = "env", value = "ZEROEX_API_KEY" } # explicit
/// api_key = { type = "plain", value = "dev-key" }
/// ```
///
/// A bare string without the `env:` prefix is taken as a plain value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "RawConfigurableValue")]
pub struct ConfigurableValue {
	#[serde(rename = "type")]
	pub value_type: ValueType,
	/// Environment variable name or the literal value
	pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	Env,
	Plain,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConfigurableValue {
	Shorthand(String),
	Explicit {
		#[serde(rename = "type")]
		value_type: ValueType,
		value: String,
	},
}

impl From<RawConfigurableValue> for ConfigurableValue {
	fn from(raw: RawConfigurableValue) -> Self {
		match raw {
			RawConfigurableValue::Shorthand(text) => Self::from(text.as_str()),
			RawConfigurableValue::Explicit { value_type, value } => Self { value_type, value },
		}
	}
}

impl ConfigurableValue {
	pub fn from_env(env_var_name: &str) -> Self {
		Self {
			value_type: ValueType::Env,
			value: env_var_name.to_string(),
		}
	}

	pub fn from_plain(plain_value: &str) -> Self {
		Self {
			value_type: ValueType::Plain,
			value: plain_value.to_string(),
		}
	}

	pub fn resolve(&self) -> Result<String, ConfigurableValueError> {
		match self.value_type {
			ValueType::Env => std::env::var(&self.value).map_err(|_| {
				ConfigurableValueError::EnvironmentVariableNotFound(self.value.clone())
			}),
			ValueType::Plain => Ok(self.value.clone()),
		}
	}

	/// Resolve straight into a [`SecretString`]; empty values are rejected
	pub fn resolve_secret(&self) -> Result<SecretString, ConfigurableValueError> {
		let resolved = self.resolve()?;
		if resolved.is_empty() {
			return Err(ConfigurableValueError::Empty(self.to_string()));
		}
		Ok(SecretString::new(resolved))
	}

	/// Human-readable origin of the value, safe to log
	pub fn description(&self) -> String {
		match self.value_type {
			ValueType::Env => format!("environment variable '{}'", self.value),
			ValueType::Plain => "configured plain value".to_string(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurableValueError {
	#[error("Environment variable '{0}' not found")]
	EnvironmentVariableNotFound(String),

	#[error("Configured value {0} resolved to an empty string")]
	Empty(String),
}

// Never print plain values
impl fmt::Display for ConfigurableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value_type {
			ValueType::Env => write!(f, "env:{}", self.value),
			ValueType::Plain => write!(f, "plain:[REDACTED]"),
		}
	}
}

impl From<&str> for ConfigurableValue {
	fn from(value: &str) -> Self {
		match value.strip_prefix("env:") {
			Some(env_var) => Self::from_env(env_var),
			None => Self::from_plain(value),
		}
	}
}
