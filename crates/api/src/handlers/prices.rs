//! Indicative price routes

use axum::{
	extract::{Path, Query, State},
	response::Json,
};
use meta_types::ProviderPriceQuote;
use tracing::info;

use crate::handlers::common::{parse_inputs, request_cancellation, service_error, ApiError, PriceQuery};
use crate::state::AppState;

/// GET /v1/{chain_id}/price - Best price, optionally from one provider
///
/// Responds with `null` when no provider produced a quote.
pub async fn get_price(
	State(state): State<AppState>,
	path: Result<Path<u64>, axum::extract::rejection::PathRejection>,
	query: Result<Query<PriceQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Option<ProviderPriceQuote>>, ApiError> {
	let (Path(chain_id), Query(query)) = parse_inputs(path, query)?;
	let provider = query.provider.clone();
	let request = query.into_request(chain_id)?;
	let (cancel, _cancel_on_drop) = request_cancellation();

	info!(
		"Price request on chain {}: {} {} -> {} (provider: {})",
		chain_id,
		request.sell_amount,
		request.sell_token,
		request.buy_token,
		provider.as_deref().unwrap_or("any")
	);

	let best = state
		.aggregator_service
		.get_best_price(&request, provider.as_deref(), &cancel)
		.await
		.map_err(service_error)?;
	Ok(Json(best))
}

/// GET /v1/{chain_id}/price/all - Every provider's price, best first
pub async fn get_all_prices(
	State(state): State<AppState>,
	path: Result<Path<u64>, axum::extract::rejection::PathRejection>,
	query: Result<Query<PriceQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<ProviderPriceQuote>>, ApiError> {
	let (Path(chain_id), Query(query)) = parse_inputs(path, query)?;
	let request = query.into_request(chain_id)?;
	let (cancel, _cancel_on_drop) = request_cancellation();

	let quotes = state
		.aggregator_service
		.get_all_prices(&request, &cancel)
		.await
		.map_err(service_error)?;

	info!("Returning {} prices for chain {}", quotes.len(), chain_id);
	Ok(Json(quotes))
}
