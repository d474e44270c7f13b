#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use jwt_refresh::{
	config::{AuthOptions, ConfigService, RefreshOptions},
	coordinator::ReqwestCoordinator,
	error::{Error, RefreshError},
	http::ReqwestTransport,
	reqwest::Client,
	store::{KeyValueStore, MemoryStore},
	url::Url,
};

fn jwt(offset: Duration) -> String {
	let exp = (OffsetDateTime::now_utc() + offset).unix_timestamp();

	format!(
		"{}.{}.",
		URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
		URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#))
	)
}

fn build_coordinator(server: &MockServer, store: &MemoryStore) -> ReqwestCoordinator {
	let config = ConfigService::new(
		RefreshOptions::new(server.url("/auth/refresh"))
			.with_payload(serde_json::json!({ "scope": "api" })),
		AuthOptions::new().with_global_header("x-client", "gate"),
		Arc::new(store.clone()),
	);

	ReqwestCoordinator::with_reqwest(config, None)
		.expect("Reqwest coordinator should build successfully.")
}

#[tokio::test]
async fn refreshes_against_a_live_endpoint() {
	let server = MockServer::start_async().await;
	let fresh = jwt(Duration::hours(1));
	let store = MemoryStore::with_entries([
		("id_token", jwt(Duration::minutes(-5))),
		("refresh_token", "r-1".to_owned()),
	]);
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/refresh")
				.header("authorization", "Bearer r-1")
				.header("content-type", "application/json")
				.header("x-client", "gate")
				.body(r#"{"scope":"api"}"#);
			then.status(200)
				.header("content-type", "application/json")
				.body(format!(r#"{{"refresh_token":"r-2","id_token":"{fresh}"}}"#));
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/items").header("authorization", format!("Bearer {fresh}"));
			then.status(200).body("[1,2,3]");
		})
		.await;
	let coordinator = build_coordinator(&server, &store);
	let url = Url::parse(&server.url("/items")).expect("Mock API URL should parse.");
	let response = coordinator.get(url.clone()).await.expect("Gated request should succeed.");

	assert_eq!(response.status(), 200);
	assert_eq!(response.body(), b"[1,2,3]");
	assert_eq!(store.get("refresh_token").expect("Store read should succeed."), Some("r-2".into()));

	coordinator.get(url).await.expect("Fresh token should pass through.");

	refresh_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn endpoint_errors_surface_as_refresh_failures() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::with_entries([
		("id_token", jwt(Duration::minutes(-5))),
		("refresh_token", "r-1".to_owned()),
	]);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(401).body(r#"{"error":"invalid_token"}"#);
		})
		.await;
	let coordinator = build_coordinator(&server, &store);
	let url = Url::parse(&server.url("/items")).expect("Mock API URL should parse.");
	let err = coordinator.get(url).await.expect_err("Refresh should fail.");

	assert!(matches!(err, Error::Refresh(RefreshError::Status { status: 401 })));
	assert!(!coordinator.is_refreshing());

	mock.assert_async().await;
}

#[tokio::test]
async fn a_preconfigured_client_carries_its_defaults_into_refreshes() {
	let server = MockServer::start_async().await;
	let fresh = jwt(Duration::hours(1));
	let store = MemoryStore::with_entries([
		("id_token", jwt(Duration::minutes(-5))),
		("refresh_token", "r-1".to_owned()),
	]);
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").header("user-agent", "gate-tests/1.0");
			then.status(200).body(format!(r#"{{"refresh_token":"r-2","id_token":"{fresh}"}}"#));
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/items").header("user-agent", "gate-tests/1.0");
			then.status(200).body("[]");
		})
		.await;
	let client = Client::builder()
		.user_agent("gate-tests/1.0")
		.build()
		.expect("Reqwest client should build.");
	let config = ConfigService::new(
		RefreshOptions::new(server.url("/auth/refresh")),
		AuthOptions::new(),
		Arc::new(store.clone()),
	);
	let coordinator = ReqwestCoordinator::new(config, ReqwestTransport::with_client(client), None)
		.expect("Reqwest coordinator should build successfully.");
	let url = Url::parse(&server.url("/items")).expect("Mock API URL should parse.");

	coordinator.get(url).await.expect("Gated request should succeed.");

	refresh_mock.assert_async().await;
	api_mock.assert_async().await;
}
