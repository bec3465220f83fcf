use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	limit::RequestBodyLimitLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Level;

use crate::auth::{require_auth, Authenticator};
use crate::handlers::{get_all_prices, get_info, get_price, get_quote, health};
use crate::security::add_security_headers;
use crate::state::AppState;

/// Build the HTTP router; state is applied by the caller with `.with_state(...)`
///
/// Only the swap quote routes pass through `authenticator`.
pub fn create_router(authenticator: Arc<dyn Authenticator>) -> Router<AppState> {
	let cors = CorsLayer::permissive();
	let body_limit = RequestBodyLimitLayer::new(64 * 1024);
	let trace = TraceLayer::new_for_http()
		.make_span_with(|req: &axum::http::Request<_>| {
			let req_id = req
				.headers()
				.get("x-request-id")
				.and_then(|v| v.to_str().ok())
				.unwrap_or("-");
			tracing::info_span!(
				"http_request",
				method = %req.method(),
				uri = %req.uri(),
				req_id
			)
		})
		.on_request(tower_http::trace::DefaultOnRequest::new().level(Level::INFO))
		.on_response(
			tower_http::trace::DefaultOnResponse::new()
				.level(Level::INFO)
				.latency_unit(tower_http::LatencyUnit::Millis),
		);
	let req_id = ServiceBuilder::new()
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.layer(PropagateRequestIdLayer::x_request_id());

	let protected = Router::new()
		.route("/v1/{chain_id}/quote", get(get_quote))
		.route("/v1/{chain_id}/quote/", get(get_quote))
		.route_layer(middleware::from_fn_with_state(authenticator, require_auth));

	let router = Router::new()
		.route("/health", get(health))
		.route("/health/", get(health))
		.route("/v1/info", get(get_info))
		.route("/v1/info/", get(get_info))
		.route("/v1/{chain_id}/price", get(get_price))
		.route("/v1/{chain_id}/price/", get(get_price))
		.route("/v1/{chain_id}/price/all", get(get_all_prices))
		.route("/v1/{chain_id}/price/all/", get(get_all_prices))
		.merge(protected)
		.layer(cors)
		.layer(CompressionLayer::new())
		.layer(trace)
		.layer(req_id)
		.layer(body_limit);

	add_security_headers(router)
}
