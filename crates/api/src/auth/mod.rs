//! Authentication for protected routes
//!
//! The swap quote route is guarded by an [`Authenticator`]; implementations
//! decide from the request headers whether the caller may proceed.

pub mod authenticators;
pub mod middleware;

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

pub use authenticators::{BearerTokenAuthenticator, JwtAuthenticator, JwtClaims, NoAuthenticator};
pub use middleware::require_auth;

/// Outcome of authenticating one request
#[derive(Debug, Clone)]
pub enum AuthenticationResult {
	Authorized(AuthContext),
	Unauthorized(String),
	/// Authentication is switched off
	Bypassed,
}

/// Authenticated caller, stored in request extensions for handlers
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
	/// Identifier of the credential that matched, or the JWT `sub` claim
	pub subject: String,
	pub authenticated_at: DateTime<Utc>,
}

impl AuthContext {
	pub fn new(subject: impl Into<String>) -> Self {
		Self {
			subject: subject.into(),
			authenticated_at: Utc::now(),
		}
	}
}

/// The parts of an HTTP request authenticators look at
#[derive(Debug, Clone)]
pub struct AuthRequest {
	pub method: String,
	pub path: String,
	/// Lower-cased header names
	pub headers: HashMap<String, String>,
}

impl AuthRequest {
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			path: path.into(),
			headers: HashMap::new(),
		}
	}

	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		self.headers.insert(name.to_lowercase(), value.to_string());
		self
	}

	pub fn from_parts(method: &str, path: &str, headers: &HeaderMap) -> Self {
		let mut request = Self::new(method, path);
		for (name, value) in headers {
			if let Ok(value) = value.to_str() {
				request.headers.insert(name.as_str().to_lowercase(), value.to_string());
			}
		}
		request
	}

	/// Token from an `Authorization: Bearer <token>` header
	pub fn bearer_token(&self) -> Option<&str> {
		let header = self.headers.get("authorization")?;
		let (scheme, token) = header.split_once(' ')?;
		if !scheme.eq_ignore_ascii_case("bearer") {
			return None;
		}
		let token = token.trim();
		(!token.is_empty()).then_some(token)
	}
}

/// Core authentication trait for pluggable auth implementations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
	async fn authenticate(&self, request: &AuthRequest) -> AuthenticationResult;

	/// Name used in logs
	fn name(&self) -> &str;
}
