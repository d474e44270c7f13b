//! Request targets and mergeable request options.

// crates.io
use ::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, header::CONTENT_TYPE};
// self
use crate::{_prelude::*, error::ConfigError, http::HttpRequest};

/// What a gated request should be sent to.
#[derive(Debug)]
pub enum RequestTarget {
	/// URL combined with the coordinator's default options and any per-call options.
	Url(Url),
	/// Fully built request, forwarded as-is apart from global and auth headers.
	Request(HttpRequest),
}
impl From<Url> for RequestTarget {
	fn from(value: Url) -> Self {
		Self::Url(value)
	}
}
impl From<HttpRequest> for RequestTarget {
	fn from(value: HttpRequest) -> Self {
		Self::Request(value)
	}
}

/// Method, headers, and body applied when building a request from a URL.
///
/// Options set at construction act as defaults; per-call options override them field by
/// field, and header by header.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// HTTP method; the call site decides the fallback when unset.
	pub method: Option<Method>,
	/// Headers added to the request.
	pub headers: HeaderMap,
	/// Request body.
	pub body: Option<Vec<u8>>,
}
impl RequestOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the HTTP method.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = Some(method);

		self
	}

	/// Sets (or replaces) a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `value` as the JSON body and defaults `content-type` accordingly.
	pub fn with_json<T>(mut self, value: &T) -> Result<Self, serde_json::Error>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(value)?);
		self.headers.entry(CONTENT_TYPE).or_insert(HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// Returns `self` overlaid with `overrides`; every header name present in `overrides`
	/// replaces all of its values in `self`.
	pub fn merge(&self, overrides: &RequestOptions) -> RequestOptions {
		let mut headers = self.headers.clone();

		for name in overrides.headers.keys() {
			headers.remove(name);
		}
		for (name, value) in overrides.headers.iter() {
			headers.append(name.clone(), value.clone());
		}

		RequestOptions {
			method: overrides.method.clone().or_else(|| self.method.clone()),
			headers,
			body: overrides.body.clone().or_else(|| self.body.clone()),
		}
	}

	pub(crate) fn build(&self, url: &Url, fallback: Method) -> Result<HttpRequest, ConfigError> {
		let mut builder =
			Request::builder().method(self.method.clone().unwrap_or(fallback)).uri(url.as_str());

		if let Some(headers) = builder.headers_mut() {
			headers.extend(self.headers.clone());
		}

		Ok(builder.body(self.body.clone().unwrap_or_default())?)
	}
}

/// Parses configured `(name, value)` pairs into a [`HeaderMap`].
pub(crate) fn header_map(pairs: &[(String, String)]) -> Result<HeaderMap, ConfigError> {
	let mut headers = HeaderMap::with_capacity(pairs.len());

	for (name, value) in pairs {
		let parsed_name = HeaderName::try_from(name.as_str()).map_err(|source| {
			ConfigError::InvalidHeaderName { name: name.clone(), source }
		})?;
		let parsed_value = HeaderValue::try_from(value.as_str()).map_err(|source| {
			ConfigError::InvalidHeaderValue { name: name.clone(), source }
		})?;

		headers.append(parsed_name, parsed_value);
	}

	Ok(headers)
}

/// Sets every global header on `request`, replacing values the request already carries.
pub(crate) fn apply_global_headers(request: &mut HttpRequest, globals: &HeaderMap) {
	for name in globals.keys() {
		request.headers_mut().remove(name);
	}
	for (name, value) in globals.iter() {
		request.headers_mut().append(name.clone(), value.clone());
	}
}
