//! Shared fixtures for the integration suites: JWT builders and a scripted transport.

#![allow(dead_code)]

// std
use std::{
	sync::{Arc, Mutex},
	time::Duration as StdDuration,
};
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use time::{Duration, OffsetDateTime};
use tokio::sync::Notify;
// self
use jwt_refresh::{
	config::{AuthOptions, ConfigService, RefreshOptions},
	coordinator::Coordinator,
	error::TransportError,
	http::{HttpRequest, HttpResponse, Transport, TransportFuture},
	http_types::{HeaderMap, Method, StatusCode},
	store::MemoryStore,
	url::Url,
};

pub const END_POINT: &str = "https://auth.example.com/refresh";

/// Builds an unsigned JWT whose `exp` lies `offset` away from now.
pub fn jwt(offset: Duration) -> String {
	let exp = (OffsetDateTime::now_utc() + offset).unix_timestamp();

	format!(
		"{}.{}.signature",
		URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
		URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user-1","exp":{exp}}}"#))
	)
}

pub fn fresh_jwt() -> String {
	jwt(Duration::hours(1))
}

pub fn expired_jwt() -> String {
	jwt(Duration::minutes(-1))
}

pub fn api_url(path: &str) -> Url {
	Url::parse("https://api.example.com/")
		.and_then(|base| base.join(path))
		.expect("API fixture URL should parse.")
}

pub fn token_body(refresh: &str, access: &str) -> String {
	format!(r#"{{"refresh_token":"{refresh}","id_token":"{access}"}}"#)
}

/// How the fake answers calls to [`END_POINT`].
#[derive(Clone, Debug)]
pub enum RefreshReply {
	Respond(u16, String),
	Fail,
	Hang,
	/// Answers like [`RefreshReply::Respond`] once the gate is notified.
	Gated(Arc<Notify>, u16, String),
}

/// Snapshot of a request the fake transport received.
#[derive(Clone, Debug)]
pub struct Recorded {
	pub method: Method,
	pub uri: String,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
}
impl Recorded {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	pub fn is_refresh(&self) -> bool {
		self.uri == END_POINT
	}
}

/// Transport answering refresh calls from a script and every other call with `200 ok`.
pub struct FakeTransport {
	reply: Mutex<RefreshReply>,
	delay: StdDuration,
	recorded: Mutex<Vec<Recorded>>,
}
impl FakeTransport {
	pub fn new(reply: RefreshReply) -> Arc<Self> {
		Self::delayed(reply, StdDuration::ZERO)
	}

	pub fn delayed(reply: RefreshReply, delay: StdDuration) -> Arc<Self> {
		Arc::new(Self { reply: Mutex::new(reply), delay, recorded: Default::default() })
	}

	pub fn issuing(refresh: &str, access: &str) -> Arc<Self> {
		Self::new(RefreshReply::Respond(200, token_body(refresh, access)))
	}

	pub fn set_reply(&self, reply: RefreshReply) {
		*self.reply.lock().expect("Reply lock should not be poisoned.") = reply;
	}

	pub fn recorded(&self) -> Vec<Recorded> {
		self.recorded.lock().expect("Recorder lock should not be poisoned.").clone()
	}

	pub fn refresh_calls(&self) -> Vec<Recorded> {
		self.recorded().into_iter().filter(Recorded::is_refresh).collect()
	}

	pub fn forwarded(&self) -> Vec<Recorded> {
		self.recorded().into_iter().filter(|call| !call.is_refresh()).collect()
	}
}
impl Transport for FakeTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let call = Recorded {
			method: request.method().clone(),
			uri: request.uri().to_string(),
			headers: request.headers().clone(),
			body: request.body().clone(),
		};
		let is_refresh = call.is_refresh();
		let reply = self.reply.lock().expect("Reply lock should not be poisoned.").clone();

		self.recorded.lock().expect("Recorder lock should not be poisoned.").push(call);

		Box::pin(async move {
			if !is_refresh {
				return Ok(response(200, "ok"));
			}
			if !self.delay.is_zero() {
				tokio::time::sleep(self.delay).await;
			}

			match reply {
				RefreshReply::Respond(status, body) => Ok(response(status, &body)),
				RefreshReply::Fail =>
					Err(TransportError::Io(std::io::Error::other("connection reset"))),
				RefreshReply::Hang => std::future::pending().await,
				RefreshReply::Gated(gate, status, body) => {
					gate.notified().await;

					Ok(response(status, &body))
				},
			}
		})
	}
}

fn response(status: u16, body: &str) -> HttpResponse {
	let mut response = HttpResponse::new(body.as_bytes().to_vec());

	*response.status_mut() =
		StatusCode::from_u16(status).expect("Fixture status code should be valid.");

	response
}

pub fn store_with(entries: &[(&str, &str)]) -> MemoryStore {
	MemoryStore::with_entries(entries.iter().copied())
}

pub fn coordinator(
	store: &MemoryStore,
	transport: &Arc<FakeTransport>,
	refresh: RefreshOptions,
	auth: AuthOptions,
) -> Coordinator<FakeTransport> {
	let config = ConfigService::new(refresh, auth, Arc::new(store.clone()));

	Coordinator::new(config, Arc::clone(transport), None)
		.expect("Coordinator fixture should build successfully.")
}

pub fn default_coordinator(
	store: &MemoryStore,
	transport: &Arc<FakeTransport>,
) -> Coordinator<FakeTransport> {
	coordinator(store, transport, RefreshOptions::new(END_POINT), AuthOptions::new())
}
