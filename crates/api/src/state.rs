use std::sync::Arc;

use meta_service::AggregatorService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub aggregator_service: Arc<AggregatorService>,
}

impl AppState {
	pub fn new(aggregator_service: Arc<AggregatorService>) -> Self {
		Self { aggregator_service }
	}
}
