//! Meta Aggregator API
//!
//! Axum routes, handlers and middleware for the meta aggregator.

pub mod auth;
pub mod handlers;
pub mod router;
pub mod security;
pub mod state;

pub use auth::{
	AuthContext, Authenticator, BearerTokenAuthenticator, JwtAuthenticator, JwtClaims, NoAuthenticator,
};
pub use router::create_router;
pub use state::AppState;
