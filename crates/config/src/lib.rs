//! Meta aggregator configuration
//!
//! Settings model, file/env loading and startup logging.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, ConfigLoadError, ENV_PREFIX};
pub use settings::{
	AggregationSettings, ChainEndpoint, ConfigValidationError, LogFormat, LoggingSettings,
	ProviderSettings, ProviderType, SecuritySettings, ServerSettings, Settings,
};
pub use startup_logger::{
	log_service_info, log_service_shutdown, log_settings_summary, log_startup_complete,
};
