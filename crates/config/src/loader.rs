//! Configuration loading utilities

use crate::settings::ConfigValidationError;
use crate::Settings;
use config::{Config, ConfigError, Environment, File};
use thiserror::Error;

/// Environment variable prefix for overrides, e.g. `META_AGG__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "META_AGG";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
	#[error("Failed to read configuration: {0}")]
	Source(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Invalid(#[from] ConfigValidationError),
}

/// Load configuration from `config/config.{toml,..}` (optional) with
/// environment overrides, then validate it.
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	load_config_from("config/config")
}

/// Same as [`load_config`] with an explicit file stem
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	let s = Config::builder()
		.add_source(File::with_name(path).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?;

	let settings: Settings = s.try_deserialize()?;
	settings.validate()?;
	Ok(settings)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_file_yields_defaults() {
		let settings = load_config_from("config/does-not-exist").unwrap();
		assert_eq!(settings.server.port, 3000);
		assert_eq!(settings.aggregation.global_timeout_ms, 5000);
		assert!(settings.providers.is_empty());
	}

	#[test]
	fn test_partial_server_section_keeps_defaults() {
		let settings: Settings = Config::builder()
			.set_override("server.port", 8080i64)
			.unwrap()
			.build()
			.unwrap()
			.try_deserialize()
			.unwrap();
		assert_eq!(settings.server.port, 8080);
		assert_eq!(settings.server.host, "0.0.0.0");

		let settings: Settings = Config::builder()
			.set_override("server.host", "127.0.0.1")
			.unwrap()
			.build()
			.unwrap()
			.try_deserialize()
			.unwrap();
		assert_eq!(settings.server.host, "127.0.0.1");
		assert_eq!(settings.server.port, 3000);
	}
}
