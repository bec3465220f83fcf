//! Provider adapter contract: metadata, trait and error taxonomy

pub mod errors;
pub mod traits;

use serde::{Deserialize, Serialize};

pub use errors::{ProviderError, ProviderErrorKind};
pub use traits::ProviderAdapter;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Descriptive metadata for one provider adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
	/// Name used for registry lookups and in quotes (`zeroex`, `oneinch`)
	pub name: String,
	pub display_name: String,
	pub version: String,
}

impl ProviderInfo {
	pub fn new(
		name: impl Into<String>,
		display_name: impl Into<String>,
		version: impl Into<String>,
	) -> Self {
		Self {
			name: name.into(),
			display_name: display_name.into(),
			version: version.into(),
		}
	}
}
