use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
	pub chain_id: u64,
	pub providers: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
	pub version: String,
	pub chains: Vec<ChainInfo>,
}

/// GET /v1/info - Supported chains and their providers
pub async fn get_info(State(state): State<AppState>) -> Json<InfoResponse> {
	let service = &state.aggregator_service;
	let chains = service
		.supported_chains()
		.into_iter()
		.map(|chain_id| ChainInfo {
			chain_id,
			providers: service.providers_for(chain_id),
		})
		.collect();

	Json(InfoResponse {
		version: env!("CARGO_PKG_VERSION").to_string(),
		chains,
	})
}
