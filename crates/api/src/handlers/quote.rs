use axum::{
	extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
	response::Json,
	Extension,
};
use meta_types::ProviderSwapQuote;
use tracing::info;

use crate::auth::AuthContext;
use crate::handlers::common::{
	parse_inputs, request_cancellation, service_error, validation_error, ApiError, PriceQuery,
};
use crate::state::AppState;

/// GET /v1/{chain_id}/quote - Executable swap from one provider
///
/// Requires `provider` and `takerAddress`. Mounted behind the auth
/// middleware.
pub async fn get_quote(
	State(state): State<AppState>,
	caller: Option<Extension<AuthContext>>,
	path: Result<Path<u64>, PathRejection>,
	query: Result<Query<PriceQuery>, QueryRejection>,
) -> Result<Json<ProviderSwapQuote>, ApiError> {
	let (Path(chain_id), Query(query)) = parse_inputs(path, query)?;

	let provider = query
		.provider
		.clone()
		.filter(|provider| !provider.is_empty())
		.ok_or_else(|| validation_error("Missing required field: provider"))?;
	if query.taker_address.is_none() {
		return Err(validation_error("Missing required field: takerAddress"));
	}

	let request = query.into_request(chain_id)?;
	let (cancel, _cancel_on_drop) = request_cancellation();

	info!(
		"Swap quote on chain {} from {} for {} (caller: {})",
		chain_id,
		provider,
		request.taker_address.as_deref().unwrap_or_default(),
		caller
			.as_ref()
			.map(|Extension(context)| context.subject.as_str())
			.unwrap_or("anonymous")
	);

	let swap = state
		.aggregator_service
		.get_swap_quote(&request, &provider, &cancel)
		.await
		.map_err(service_error)?;
	Ok(Json(swap))
}
