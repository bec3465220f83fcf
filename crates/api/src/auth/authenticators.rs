//! Authentication implementations

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use meta_types::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::{AuthContext, AuthRequest, AuthenticationResult, Authenticator};

/// No-op authenticator that allows all requests
#[derive(Debug, Default)]
pub struct NoAuthenticator;

#[async_trait]
impl Authenticator for NoAuthenticator {
	async fn authenticate(&self, _request: &AuthRequest) -> AuthenticationResult {
		debug!("NoAuthenticator: bypassing authentication");
		AuthenticationResult::Bypassed
	}

	fn name(&self) -> &str {
		"NoAuthenticator"
	}
}

/// Accepts `Authorization: Bearer <token>` for any configured token
///
/// With no tokens configured every request is rejected.
#[derive(Debug, Default)]
pub struct BearerTokenAuthenticator {
	tokens: Vec<SecretString>,
}

impl BearerTokenAuthenticator {
	pub fn new(tokens: Vec<SecretString>) -> Self {
		let tokens: Vec<SecretString> = tokens.into_iter().filter(|t| !t.is_empty()).collect();
		if tokens.is_empty() {
			warn!("No API tokens configured; protected routes will reject every request");
		}
		Self { tokens }
	}

	pub fn token_count(&self) -> usize {
		self.tokens.len()
	}
}

#[async_trait]
impl Authenticator for BearerTokenAuthenticator {
	async fn authenticate(&self, request: &AuthRequest) -> AuthenticationResult {
		let Some(presented) = request.bearer_token() else {
			return AuthenticationResult::Unauthorized("Missing bearer token".to_string());
		};

		// Check every token so timing does not reveal which one matched
		let matched = self
			.tokens
			.iter()
			.enumerate()
			.fold(None, |found, (index, token)| {
				if token.matches(presented) {
					found.or(Some(index))
				} else {
					found
				}
			});

		match matched {
			Some(index) => AuthenticationResult::Authorized(AuthContext::new(format!("token-{}", index))),
			None => AuthenticationResult::Unauthorized("Invalid bearer token".to_string()),
		}
	}

	fn name(&self) -> &str {
		"BearerTokenAuthenticator"
	}
}

/// Claims carried by an accepted JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
	/// Caller identity, copied into [`AuthContext::subject`]
	pub sub: String,
	/// Expiry as seconds since the Unix epoch
	pub exp: u64,
}

/// Accepts `Authorization: Bearer <jwt>` signed with a shared HS256 secret
///
/// The token must carry `sub` and an unexpired `exp`.
pub struct JwtAuthenticator {
	key: DecodingKey,
	validation: Validation,
}

impl JwtAuthenticator {
	pub fn new(secret: &SecretString) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);
		validation.set_required_spec_claims(&["exp", "sub"]);
		Self {
			key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
			validation,
		}
	}
}

impl fmt::Debug for JwtAuthenticator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("JwtAuthenticator")
			.field("algorithms", &self.validation.algorithms)
			.field("leeway", &self.validation.leeway)
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
	async fn authenticate(&self, request: &AuthRequest) -> AuthenticationResult {
		let Some(token) = request.bearer_token() else {
			return AuthenticationResult::Unauthorized("Missing bearer token".to_string());
		};

		match decode::<JwtClaims>(token, &self.key, &self.validation) {
			Ok(data) => AuthenticationResult::Authorized(AuthContext::new(data.claims.sub)),
			Err(e) => {
				debug!("JWT rejected: {}", e);
				let reason = match e.kind() {
					ErrorKind::ExpiredSignature => "Token expired",
					ErrorKind::InvalidSignature => "Invalid token signature",
					ErrorKind::MissingRequiredClaim(_) => "Token is missing required claims",
					_ => "Invalid token",
				};
				AuthenticationResult::Unauthorized(reason.to_string())
			},
		}
	}

	fn name(&self) -> &str {
		"JwtAuthenticator"
	}
}
