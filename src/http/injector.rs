//! Token-injection step that attaches a credential to an outbound request.

// crates.io
use ::http::{HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	config::AuthConfig,
	error::ConfigError,
	http::HttpRequest,
	token::TokenSecret,
};

/// Describes how to attach a token to an outbound request.
///
/// The coordinator runs the same injector for forwarded requests (access token) and for
/// the refresh call (refresh token).
pub trait TokenInjector
where
	Self: Send + Sync,
{
	/// Injects authorization state derived from `token` into `request`.
	fn attach_token(&self, request: &mut HttpRequest, token: &TokenSecret)
	-> Result<(), ConfigError>;
}

/// Writes `<prefix><token>` into a single header, replacing any previous value.
#[derive(Clone, Debug)]
pub struct HeaderInjector {
	name: HeaderName,
	prefix: String,
}
impl HeaderInjector {
	/// Creates an injector for `name`, e.g. `Authorization` with prefix `"Bearer "`.
	pub fn new(name: &str, prefix: impl Into<String>) -> Result<Self, ConfigError> {
		let name = HeaderName::try_from(name)
			.map_err(|source| ConfigError::InvalidHeaderName { name: name.to_owned(), source })?;

		Ok(Self { name, prefix: prefix.into() })
	}

	/// Creates an injector from the access-token configuration's header settings.
	pub fn from_config(auth: &AuthConfig) -> Result<Self, ConfigError> {
		Self::new(&auth.header_name, auth.header_prefix.clone())
	}
}
impl TokenInjector for HeaderInjector {
	fn attach_token(
		&self,
		request: &mut HttpRequest,
		token: &TokenSecret,
	) -> Result<(), ConfigError> {
		let mut value = HeaderValue::try_from(format!("{}{}", self.prefix, token.expose()))
			.map_err(|source| ConfigError::InvalidHeaderValue {
				name: self.name.to_string(),
				source,
			})?;

		value.set_sensitive(true);
		request.headers_mut().insert(self.name.clone(), value);

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn writes_prefixed_sensitive_header() {
		let injector =
			HeaderInjector::new("Authorization", "Bearer ").expect("Header name should parse.");
		let mut request = HttpRequest::new(Vec::new());

		injector
			.attach_token(&mut request, &TokenSecret::new("abc"))
			.expect("Token should be attached.");

		let value = &request.headers()["authorization"];

		assert_eq!(value, "Bearer abc");
		assert!(value.is_sensitive());
	}

	#[test]
	fn rejects_tokens_that_cannot_be_header_values() {
		let injector = HeaderInjector::new("x-token", "").expect("Header name should parse.");
		let mut request = HttpRequest::new(Vec::new());
		let err = injector
			.attach_token(&mut request, &TokenSecret::new("line\nbreak"))
			.expect_err("Control characters are not valid in header values.");

		assert!(matches!(err, ConfigError::InvalidHeaderValue { ref name, .. } if name == "x-token"));
	}
}
