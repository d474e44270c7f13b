//! Transport primitives the coordinator forwards gated requests through.
//!
//! [`Transport`] is the crate's only dependency on an HTTP stack. Requests and responses
//! are plain [`::http`] values with owned byte bodies, so any client can be adapted;
//! [`ReqwestTransport`] ships behind the default `reqwest` feature.

pub mod injector;
pub mod request;

pub use injector::*;
pub use request::*;

// crates.io
use ::http::{Request, Response};
// self
use crate::{_prelude::*, error::TransportError};

/// Outgoing request with an owned body.
pub type HttpRequest = Request<Vec<u8>>;
/// Response with a fully buffered body.
pub type HttpResponse = Response<Vec<u8>>;

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP clients able to execute a request and buffer its response.
///
/// Implementations must be `Send + Sync + 'static` so a coordinator and all of its clones
/// can share one transport behind an `Arc`.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the buffered response.
	///
	/// Non-success statuses are returned as responses, not errors; only failures to obtain
	/// a response at all map to [`TransportError`].
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let request = reqwest::Request::try_from(request)?;
			let response = client.execute(request).await?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let mut converted = HttpResponse::new(response.bytes().await?.to_vec());

			*converted.status_mut() = status;
			*converted.version_mut() = version;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}
