//! Configured HTTP providers against a local fake upstream
//!
//! Builds the registry from settings (0x and 1inch on chain 1), points both
//! at an in-process axum server and checks the wire mapping end to end.

mod mocks;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
	extract::{Query, State},
	http::{HeaderMap, StatusCode},
	routing::get,
	Json, Router,
};
use meta_aggregator::config::{
	ChainEndpoint, ConfigurableValue, ProviderSettings, ProviderType, Settings,
};
use reqwest::Client;
use serde_json::{json, Value};

use crate::mocks::fixtures::{price_query, quote_query, test_settings, API_TOKEN, ONE_ETH};
use crate::mocks::TestServer;

const ZEROEX_KEY: &str = "zeroex-test-key";
const ONEINCH_KEY: &str = "oneinch-test-key";
const EXCHANGE_PROXY: &str = "0xdef1c0ded9bec7f1a1670819833240f027b25eff";

#[derive(Clone, Default)]
struct Upstream {
	zeroex_calls: Arc<AtomicUsize>,
	oneinch_calls: Arc<AtomicUsize>,
	zeroex_status: Option<StatusCode>,
}

fn zeroex_authorized(headers: &HeaderMap) -> bool {
	headers.get("0x-api-key").and_then(|v| v.to_str().ok()) == Some(ZEROEX_KEY)
}

fn oneinch_authorized(headers: &HeaderMap) -> bool {
	headers.get("authorization").and_then(|v| v.to_str().ok())
		== Some(format!("Bearer {}", ONEINCH_KEY).as_str())
}

fn zeroex_price_body() -> Value {
	json!({
		"buyAmount": "2000000000",
		"sellAmount": ONE_ETH,
		"estimatedGas": "150000",
		"gasPrice": "30000000000",
		"sources": [
			{ "name": "Uniswap_V3", "proportion": "1" },
			{ "name": "Curve", "proportion": "0" }
		]
	})
}

async fn zeroex_price(
	State(upstream): State<Upstream>,
	headers: HeaderMap,
	Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
	upstream.zeroex_calls.fetch_add(1, Ordering::SeqCst);
	if let Some(status) = upstream.zeroex_status {
		return (status, Json(json!({ "reason": "upstream failure" })));
	}
	if !zeroex_authorized(&headers) || params.get("sellAmount").map(String::as_str) != Some(ONE_ETH) {
		return (StatusCode::UNAUTHORIZED, Json(json!({ "reason": "bad request" })));
	}
	(StatusCode::OK, Json(zeroex_price_body()))
}

async fn zeroex_quote(
	State(upstream): State<Upstream>,
	headers: HeaderMap,
	Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
	upstream.zeroex_calls.fetch_add(1, Ordering::SeqCst);
	if !zeroex_authorized(&headers) || !params.contains_key("takerAddress") {
		return (StatusCode::UNAUTHORIZED, Json(json!({ "reason": "bad request" })));
	}
	let mut body = zeroex_price_body();
	body["to"] = json!(EXCHANGE_PROXY);
	body["data"] = json!("0xd9627aa4");
	body["value"] = json!("0");
	body["allowanceTarget"] = json!(EXCHANGE_PROXY);
	body["gas"] = json!("180000");
	(StatusCode::OK, Json(body))
}

async fn oneinch_quote(
	State(upstream): State<Upstream>,
	headers: HeaderMap,
	Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
	upstream.oneinch_calls.fetch_add(1, Ordering::SeqCst);
	let v5_2_params = params.contains_key("src") && params.contains_key("dst");
	if !oneinch_authorized(&headers)
		|| !v5_2_params
		|| params.get("amount").map(String::as_str) != Some(ONE_ETH)
	{
		return (StatusCode::UNAUTHORIZED, Json(json!({ "description": "bad request" })));
	}
	(
		StatusCode::OK,
		Json(json!({
			"toAmount": "2100000000",
			"fromAmount": ONE_ETH,
			"gas": 180000,
			"protocols": [[[{ "name": "UNISWAP_V3", "part": 100 }]]]
		})),
	)
}

async fn spawn_upstream(upstream: Upstream) -> String {
	let app = Router::new()
		.route("/swap/v1/price", get(zeroex_price))
		.route("/swap/v1/quote", get(zeroex_quote))
		.route("/1/quote", get(oneinch_quote))
		.with_state(upstream);

	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		let _ = axum::serve(listener, app).await;
	});
	format!("http://{}", addr)
}

fn provider(provider_type: ProviderType, api_key: &str, endpoint: &str) -> ProviderSettings {
	ProviderSettings {
		provider_type,
		enabled: true,
		timeout_ms: 500,
		api_key: Some(ConfigurableValue::from_plain(api_key)),
		chains: vec![ChainEndpoint {
			chain_id: 1,
			endpoint: endpoint.to_string(),
		}],
	}
}

fn settings_for(endpoint: &str) -> Settings {
	let mut settings = test_settings();
	settings.providers.insert(
		"zeroex".to_string(),
		provider(ProviderType::ZeroEx, ZEROEX_KEY, endpoint),
	);
	settings.providers.insert(
		"oneinch".to_string(),
		provider(ProviderType::OneInch, ONEINCH_KEY, endpoint),
	);
	settings
}

#[tokio::test]
async fn test_configured_providers_are_aggregated() {
	let upstream = Upstream::default();
	let endpoint = spawn_upstream(upstream.clone()).await;
	let server = TestServer::spawn_with_settings(settings_for(&endpoint), &[])
		.await
		.expect("Failed to start test server");

	let body: Value = Client::new()
		.get(server.url(&format!("/v1/1/price/all?{}", price_query())))
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();

	let quotes = body.as_array().unwrap();
	assert_eq!(quotes.len(), 2);

	assert_eq!(quotes[0]["provider"], "oneinch");
	assert_eq!(quotes[0]["isBest"], true);
	assert_eq!(quotes[0]["buyAmount"], "2100000000");
	assert_eq!(quotes[0]["estimatedGas"], 180_000);
	assert_eq!(quotes[0]["sources"][0]["name"], "UNISWAP_V3");
	assert!((quotes[0]["sources"][0]["proportion"].as_f64().unwrap() - 1.0).abs() < 1e-9);

	assert_eq!(quotes[1]["provider"], "zeroex");
	assert_eq!(quotes[1]["isBest"], false);
	assert_eq!(quotes[1]["buyAmount"], "2000000000");
	assert_eq!(quotes[1]["gasPrice"], "30000000000");
	// Zero-proportion sources are dropped
	assert_eq!(quotes[1]["sources"].as_array().unwrap().len(), 1);

	assert_eq!(upstream.zeroex_calls.load(Ordering::SeqCst), 1);
	assert_eq!(upstream.oneinch_calls.load(Ordering::SeqCst), 1);

	server.abort();
}

#[tokio::test]
async fn test_upstream_failure_leaves_other_provider() {
	let upstream = Upstream {
		zeroex_status: Some(StatusCode::TOO_MANY_REQUESTS),
		..Default::default()
	};
	let endpoint = spawn_upstream(upstream.clone()).await;
	let server = TestServer::spawn_with_settings(settings_for(&endpoint), &[])
		.await
		.expect("Failed to start test server");
	let client = Client::new();

	let body: Value = client
		.get(server.url(&format!("/v1/1/price?{}", price_query())))
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();
	assert_eq!(body["provider"], "oneinch");

	let body: Value = client
		.get(server.url(&format!("/v1/1/price?{}&provider=zeroex", price_query())))
		.send()
		.await
		.unwrap()
		.json()
		.await
		.unwrap();
	assert!(body.is_null());

	server.abort();
}

#[tokio::test]
async fn test_zeroex_swap_quote() {
	let upstream = Upstream::default();
	let endpoint = spawn_upstream(upstream.clone()).await;
	let server = TestServer::spawn_with_settings(settings_for(&endpoint), &[])
		.await
		.expect("Failed to start test server");

	let resp = Client::new()
		.get(server.url(&format!("/v1/1/quote?{}", quote_query("zeroex"))))
		.bearer_auth(API_TOKEN)
		.send()
		.await
		.unwrap();
	assert_eq!(resp.status(), reqwest::StatusCode::OK);

	let body: Value = resp.json().await.unwrap();
	assert_eq!(body["provider"], "zeroex");
	assert_eq!(body["to"], EXCHANGE_PROXY);
	assert_eq!(body["allowanceTarget"], EXCHANGE_PROXY);
	assert_eq!(body["gas"], 180_000);
	assert_eq!(upstream.oneinch_calls.load(Ordering::SeqCst), 0);

	server.abort();
}

#[tokio::test]
async fn test_invalid_provider_settings_fail_startup() {
	let mut settings = settings_for("not a url");
	settings.providers.remove("oneinch");

	let result = meta_aggregator::AggregatorBuilder::new()
		.with_settings(settings)
		.start()
		.await;
	assert!(result.is_err());
}
