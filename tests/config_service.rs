// std
use std::{env, fs, process, sync::Arc, time::Duration as StdDuration};
// self
use jwt_refresh::{
	config::{
		AuthConfig, AuthOptions, ConfigService, FnTokenGetter, FnTokenSetter, RefreshConfig,
		RefreshOptions,
	},
	http::HttpResponse,
	store::{FileStore, KeyValueStore, MemoryStore},
	token::TokenSecret,
};

const END_POINT: &str = "https://auth.example.com/refresh";

fn service(refresh: RefreshOptions, auth: AuthOptions, store: &MemoryStore) -> ConfigService {
	ConfigService::new(refresh, auth, Arc::new(store.clone()))
}

fn response(body: &str) -> HttpResponse {
	HttpResponse::new(body.as_bytes().to_vec())
}

#[tokio::test]
async fn only_an_endpoint_yields_the_defaults() {
	let store = MemoryStore::with_entries([("refresh_token", "r-1"), ("id_token", "a-1")]);
	let config = service(RefreshOptions::new(END_POINT), AuthOptions::new(), &store);
	let refresh = config.refresh_config();
	let auth = config.auth_config();

	assert_eq!(refresh.end_point.as_deref(), Some(END_POINT));
	assert_eq!(refresh.payload, serde_json::json!({}));
	assert_eq!(refresh.before_seconds, 600);
	assert_eq!(refresh.token_name, "refresh_token");
	assert_eq!(refresh.refresh_timeout, Some(RefreshConfig::DEFAULT_REFRESH_TIMEOUT));
	assert_eq!(auth.token_name, AuthConfig::DEFAULT_TOKEN_NAME);
	assert_eq!(auth.header_name, "Authorization");
	assert_eq!(auth.header_prefix, "Bearer ");
	assert!(auth.global_headers.is_empty());
	assert!(!auth.require_token);
	assert_eq!(
		refresh.refresh_token_getter.token().await.expect("Default getter should read the store."),
		Some(TokenSecret::new("r-1"))
	);
	assert_eq!(
		auth.token_getter.token().await.expect("Default getter should read the store."),
		Some(TokenSecret::new("a-1"))
	);
	assert!(
		refresh
			.token_setter
			.set_tokens(&response(r#"{"refresh_token":"r-2","id_token":"a-2"}"#))
			.await
			.expect("Default setter should accept a complete body.")
	);
	assert_eq!(store.get("refresh_token").expect("Store read should succeed."), Some("r-2".into()));
}

#[tokio::test]
async fn explicit_fields_are_preserved() {
	let store = MemoryStore::default();
	let config = service(
		RefreshOptions::new(END_POINT)
			.with_payload(serde_json::json!({ "client": "web" }))
			.with_before_seconds(0)
			.with_token_name("rt")
			.without_refresh_timeout()
			.with_refresh_token_getter(FnTokenGetter::new(|| Some("custom".into())))
			.with_token_setter(FnTokenSetter::new(|_: &HttpResponse| true)),
		AuthOptions::new()
			.with_token_name("access")
			.with_header_name("x-token")
			.with_header_prefix("")
			.with_global_header("x-client", "gate")
			.with_require_token(true),
		&store,
	);
	let refresh = config.refresh_config();
	let auth = config.auth_config();

	assert_eq!(refresh.payload, serde_json::json!({ "client": "web" }));
	assert_eq!(refresh.before_seconds, 0);
	assert_eq!(refresh.token_name, "rt");
	assert_eq!(refresh.refresh_timeout, None);
	assert_eq!(
		refresh.refresh_token_getter.token().await.expect("Custom getter should resolve."),
		Some(TokenSecret::new("custom"))
	);
	assert!(
		refresh.token_setter.set_tokens(&response("")).await.expect("Custom setter should run.")
	);
	assert!(store.is_empty());
	assert_eq!(auth.token_name, "access");
	assert_eq!(auth.header_name, "x-token");
	assert_eq!(auth.header_prefix, "");
	assert_eq!(auth.global_headers, vec![("x-client".to_owned(), "gate".to_owned())]);
	assert!(auth.require_token);
}

#[tokio::test]
async fn default_setter_uses_the_configured_token_names() {
	let store = MemoryStore::with_entries([("rt", "old"), ("access", "old")]);
	let config = service(
		RefreshOptions::new(END_POINT).with_token_name("rt"),
		AuthOptions::new().with_token_name("access"),
		&store,
	);
	let setter = &config.refresh_config().token_setter;

	assert!(
		setter
			.set_tokens(&response(r#"{"rt":"r-2","access":"a-2"}"#))
			.await
			.expect("Default setter should not fail.")
	);
	assert_eq!(store.get("access").expect("Store read should succeed."), Some("a-2".into()));
	assert!(
		!setter
			.set_tokens(&response(r#"{"rt":"r-3"}"#))
			.await
			.expect("Default setter should report incomplete bodies as false.")
	);
	assert!(store.is_empty());
}

#[test]
fn resolution_is_idempotent() {
	let store = MemoryStore::default();
	let options = RefreshOptions::new(END_POINT).with_before_seconds(30);
	let first = service(options.clone(), AuthOptions::new(), &store);
	let second = service(options, AuthOptions::new(), &store);

	assert_eq!(format!("{first:?}"), format!("{second:?}"));
}

#[test]
fn options_deserialize_from_json() {
	let refresh: RefreshOptions = serde_json::from_value(serde_json::json!({
		"end_point": END_POINT,
		"payload": { "grant": "refresh" },
		"before_seconds": 30,
		"refresh_timeout_ms": 1500
	}))
	.expect("Refresh options should deserialize.");
	let auth: AuthOptions = serde_json::from_value(serde_json::json!({
		"header_prefix": "Token ",
		"global_headers": [["x-client", "gate"]],
		"require_token": true
	}))
	.expect("Auth options should deserialize.");
	let config = service(refresh, auth, &MemoryStore::default());

	assert_eq!(config.refresh_config().before_seconds, 30);
	assert_eq!(config.refresh_config().token_name, "refresh_token");
	assert_eq!(config.refresh_config().refresh_timeout, Some(StdDuration::from_millis(1500)));
	assert_eq!(config.auth_config().header_prefix, "Token ");
	assert_eq!(config.auth_config().header_name, "Authorization");
	assert!(config.auth_config().require_token);
}

#[tokio::test]
async fn default_capabilities_persist_through_a_file_store() {
	let path = env::temp_dir().join(format!("jwt_refresh_config_{}.json", process::id()));
	let store = FileStore::open(&path).expect("File store should open.");
	let config = ConfigService::new(
		RefreshOptions::new(END_POINT),
		AuthOptions::new(),
		Arc::new(store.clone()),
	);

	assert!(
		config
			.refresh_config()
			.token_setter
			.set_tokens(&response(r#"{"refresh_token":"r-1","id_token":"a-1"}"#))
			.await
			.expect("Default setter should persist to disk.")
	);

	let reopened = FileStore::open(&path).expect("File store should reopen.");

	assert_eq!(reopened.get("refresh_token").expect("Store read should succeed."), Some("r-1".into()));
	assert_eq!(reopened.get("id_token").expect("Store read should succeed."), Some("a-1".into()));

	fs::remove_file(&path).expect("Temporary snapshot should be removable.");
}
