//! Demonstrates plugging an in-process [`Transport`] into the coordinator.
//!
//! 1. Implement [`Transport`] so refresh calls return freshly minted tokens and every other
//!    request echoes the header it received.
//! 2. Seed a [`MemoryStore`] with an expired access token and a refresh token.
//! 3. Fire several requests at once and watch a single refresh cycle serve all of them.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use time::{Duration, OffsetDateTime};
// self
use jwt_refresh::{
	config::{AuthOptions, ConfigService, RefreshOptions},
	coordinator::Coordinator,
	http::{HttpRequest, HttpResponse, Transport, TransportFuture},
	store::MemoryStore,
	url::Url,
};

const REFRESH_URL: &str = "https://auth.example.com/refresh";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store = MemoryStore::with_entries([
		("id_token", mint(Duration::minutes(-1))),
		("refresh_token", "demo-refresh-0".to_owned()),
	]);
	let transport = Arc::new(MintingTransport::default());
	let config = ConfigService::new(
		RefreshOptions::new(REFRESH_URL).with_payload(serde_json::json!({ "client": "demo" })),
		AuthOptions::new(),
		Arc::new(store),
	);
	let coordinator = <Coordinator<MintingTransport>>::new(config, Arc::clone(&transport), None)?;
	let mut phases = coordinator.subscribe_refresh_state();
	let mut refresh_tokens = coordinator.subscribe_refresh_tokens();
	let tasks = (0..3)
		.map(|i| {
			let coordinator = coordinator.clone();

			tokio::spawn(async move {
				let url = Url::parse(&format!("https://api.example.com/reports/{i}"))?;

				Ok::<_, color_eyre::Report>(coordinator.get(url).await?)
			})
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let response = task.await??;

		println!("API answered: {}.", String::from_utf8_lossy(response.body()));
	}

	while let Ok(refreshing) = phases.try_recv() {
		println!("Refresh phase changed: refreshing = {refreshing}.");
	}

	if let Ok(Some(token)) = refresh_tokens.try_recv() {
		println!("New refresh token published: {}.", token.expose());
	}

	println!(
		"Refresh calls: {}, attempts recorded: {}, coalesced waits: {}.",
		transport.refreshes.load(Ordering::Relaxed),
		coordinator.metrics.attempts(),
		coordinator.metrics.coalesced()
	);

	Ok(())
}

fn mint(offset: Duration) -> String {
	let exp = (OffsetDateTime::now_utc() + offset).unix_timestamp();

	format!(
		"{}.{}.demo",
		URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
		URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#))
	)
}

#[derive(Default)]
struct MintingTransport {
	refreshes: AtomicUsize,
}
impl Transport for MintingTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			if request.uri() == REFRESH_URL {
				let n = self.refreshes.fetch_add(1, Ordering::Relaxed) + 1;

				tokio::time::sleep(std::time::Duration::from_millis(50)).await;

				let body = serde_json::json!({
					"refresh_token": format!("demo-refresh-{n}"),
					"id_token": mint(Duration::hours(1)),
				});

				return Ok(HttpResponse::new(body.to_string().into_bytes()));
			}

			let auth = request
				.headers()
				.get("authorization")
				.and_then(|value| value.to_str().ok())
				.unwrap_or("<anonymous>")
				.chars()
				.take(24)
				.collect::<String>();

			Ok(HttpResponse::new(format!("{} with {auth}...", request.uri().path()).into_bytes()))
		})
	}
}
