//! Test server for integration tests

#![allow(dead_code)]

use meta_aggregator::config::Settings;
use meta_aggregator::AggregatorBuilder;
use tokio::task::JoinHandle;

use super::adapters::MockAdapter;
use super::fixtures::test_settings;

/// Running server bound to an ephemeral local port
pub struct TestServer {
	pub base_url: String,
	pub handle: JoinHandle<()>,
}

impl TestServer {
	/// Spawn with the given mock adapters registered on chain 1
	pub async fn spawn_with_adapters(
		adapters: &[MockAdapter],
	) -> Result<Self, Box<dyn std::error::Error>> {
		Self::spawn_with_settings(test_settings(), adapters).await
	}

	pub async fn spawn_with_settings(
		settings: Settings,
		adapters: &[MockAdapter],
	) -> Result<Self, Box<dyn std::error::Error>> {
		let builder = adapters
			.iter()
			.fold(AggregatorBuilder::new().with_settings(settings), |builder, adapter| {
				builder.with_provider(1, adapter.shared())
			});
		Self::spawn_builder(builder).await
	}

	pub async fn spawn_builder(
		builder: AggregatorBuilder,
	) -> Result<Self, Box<dyn std::error::Error>> {
		let (app, _state) = builder.start().await?;

		let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let base_url = format!("http://{}:{}", addr.ip(), addr.port());

		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		Ok(Self { base_url, handle })
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	#[allow(dead_code)]
	pub fn abort(self) {
		self.handle.abort();
	}
}
