//! Access-token configuration: where the bearer token comes from and how it is sent.

// self
use crate::{
	_prelude::*,
	config::{StoreTokenGetter, TokenGetter},
	store::KeyValueStore,
};

/// Caller-supplied access-token settings; unset fields take their defaults on resolution.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthOptions {
	/// Storage key and response field of the access token.
	pub token_name: Option<String>,
	/// Header carrying the token.
	pub header_name: Option<String>,
	/// Text written before the token in the header value.
	pub header_prefix: Option<String>,
	/// Headers set on every outgoing request, the refresh call included.
	pub global_headers: Vec<(String, String)>,
	/// Fail requests that find no access token instead of sending them anonymously.
	pub require_token: bool,
	/// Custom access-token source; defaults to reading `token_name` from the store.
	#[serde(skip)]
	pub token_getter: Option<Arc<dyn TokenGetter>>,
}
impl AuthOptions {
	/// Creates options with every field unset.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the token name.
	pub fn with_token_name(mut self, name: impl Into<String>) -> Self {
		self.token_name = Some(name.into());

		self
	}

	/// Overrides the header name.
	pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
		self.header_name = Some(name.into());

		self
	}

	/// Overrides the header prefix.
	pub fn with_header_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.header_prefix = Some(prefix.into());

		self
	}

	/// Adds a header sent with every request.
	pub fn with_global_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.global_headers.push((name.into(), value.into()));

		self
	}

	/// Sets whether a missing access token fails the request.
	pub fn with_require_token(mut self, require: bool) -> Self {
		self.require_token = require;

		self
	}

	/// Replaces the access-token source.
	pub fn with_token_getter(mut self, getter: impl 'static + TokenGetter) -> Self {
		self.token_getter = Some(Arc::new(getter));

		self
	}
}
impl Debug for AuthOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthOptions")
			.field("token_name", &self.token_name)
			.field("header_name", &self.header_name)
			.field("header_prefix", &self.header_prefix)
			.field("global_headers", &self.global_headers)
			.field("require_token", &self.require_token)
			.field("token_getter_set", &self.token_getter.is_some())
			.finish()
	}
}

/// Fully resolved access-token configuration.
#[derive(Clone)]
pub struct AuthConfig {
	/// Storage key and response field of the access token.
	pub token_name: String,
	/// Header carrying the token.
	pub header_name: String,
	/// Text written before the token in the header value.
	pub header_prefix: String,
	/// Headers set on every outgoing request.
	pub global_headers: Vec<(String, String)>,
	/// Whether a missing access token fails the request.
	pub require_token: bool,
	/// Source of the current access token.
	pub token_getter: Arc<dyn TokenGetter>,
}
impl AuthConfig {
	/// Default access-token storage key.
	pub const DEFAULT_TOKEN_NAME: &'static str = "id_token";
	/// Default header carrying the token.
	pub const DEFAULT_HEADER_NAME: &'static str = "Authorization";
	/// Default header prefix.
	pub const DEFAULT_HEADER_PREFIX: &'static str = "Bearer ";

	/// Fills every unset field of `options` with its default.
	pub fn resolve(options: &AuthOptions, store: &Arc<dyn KeyValueStore>) -> Self {
		let token_name =
			options.token_name.clone().unwrap_or_else(|| Self::DEFAULT_TOKEN_NAME.to_owned());
		let token_getter = options.token_getter.clone().unwrap_or_else(|| {
			Arc::new(StoreTokenGetter::new(Arc::clone(store), token_name.clone()))
		});

		Self {
			header_name: options
				.header_name
				.clone()
				.unwrap_or_else(|| Self::DEFAULT_HEADER_NAME.to_owned()),
			header_prefix: options
				.header_prefix
				.clone()
				.unwrap_or_else(|| Self::DEFAULT_HEADER_PREFIX.to_owned()),
			global_headers: options.global_headers.clone(),
			require_token: options.require_token,
			token_name,
			token_getter,
		}
	}
}
impl Debug for AuthConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthConfig")
			.field("token_name", &self.token_name)
			.field("header_name", &self.header_name)
			.field("header_prefix", &self.header_prefix)
			.field("global_headers", &self.global_headers)
			.field("require_token", &self.require_token)
			.finish()
	}
}
