//! Demonstrates the default reqwest transport against a mock API whose access tokens expire.

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use jwt_refresh::{
	config::{AuthOptions, ConfigService, RefreshOptions},
	coordinator::ReqwestCoordinator,
	store::{KeyValueStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let fresh = jwt(Duration::minutes(30));
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").header("authorization", "Bearer demo-refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!(r#"{{"refresh_token":"demo-refresh-2","id_token":"{fresh}"}}"#));
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/profile").header("authorization", format!("Bearer {fresh}"));
			then.status(200).body(r#"{"name":"Demo User"}"#);
		})
		.await;
	let store = MemoryStore::with_entries([
		("id_token", jwt(Duration::minutes(2))),
		("refresh_token", "demo-refresh".to_owned()),
	]);
	let config = ConfigService::new(
		RefreshOptions::new(server.url("/auth/refresh")),
		AuthOptions::new().with_global_header("x-client", "reqwest-demo"),
		Arc::new(store.clone()),
	);
	let coordinator = ReqwestCoordinator::with_reqwest(config, None)?;
	// The stored token is still valid for two minutes but falls inside the 600s margin.
	let response = coordinator.get(Url::parse(&server.url("/profile"))?).await?;

	println!("Profile: {}.", String::from_utf8_lossy(response.body()));
	println!("Stored refresh token: {:?}.", store.get("refresh_token")?);

	refresh_mock.assert_async().await;
	profile_mock.assert_async().await;

	Ok(())
}

fn jwt(offset: Duration) -> String {
	let exp = (OffsetDateTime::now_utc() + offset).unix_timestamp();

	format!(
		"{}.{}.demo",
		URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
		URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#))
	)
}
