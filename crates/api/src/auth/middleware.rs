//! Authentication middleware using the auth traits

use axum::{
	extract::{Request, State},
	http::StatusCode,
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{AuthRequest, AuthenticationResult, Authenticator};
use crate::handlers::common::ErrorResponse;

/// Reject requests the authenticator does not authorize
///
/// Mount with `axum::middleware::from_fn_with_state(authenticator, require_auth)`
/// on the routes to protect. Authorized requests carry their
/// [`AuthContext`](super::AuthContext) in the request extensions.
pub async fn require_auth(
	State(authenticator): State<Arc<dyn Authenticator>>,
	mut request: Request,
	next: Next,
) -> Response {
	let auth_request = AuthRequest::from_parts(
		request.method().as_str(),
		request.uri().path(),
		request.headers(),
	);

	match authenticator.authenticate(&auth_request).await {
		AuthenticationResult::Authorized(context) => {
			debug!(
				"Request to {} authenticated as {} by {}",
				auth_request.path,
				context.subject,
				authenticator.name()
			);
			request.extensions_mut().insert(context);
			next.run(request).await
		},
		AuthenticationResult::Bypassed => next.run(request).await,
		AuthenticationResult::Unauthorized(reason) => {
			warn!("Authentication failed for {}: {}", auth_request.path, reason);
			(
				StatusCode::UNAUTHORIZED,
				Json(ErrorResponse::new("UNAUTHORIZED", reason)),
			)
				.into_response()
		},
	}
}
