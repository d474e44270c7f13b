//! Refresh policy: endpoint, payload, safety margin, and the token capabilities.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	config::{AuthConfig, StoreTokenGetter, StoreTokenSetter, TokenGetter, TokenSetter},
	store::KeyValueStore,
};

/// Caller-supplied refresh settings; unset fields take their defaults on resolution.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefreshOptions {
	/// Absolute URL of the refresh endpoint.
	pub end_point: Option<String>,
	/// JSON body of the refresh call.
	pub payload: Option<serde_json::Value>,
	/// Seconds before the real expiry at which a token already counts as expired.
	pub before_seconds: Option<i64>,
	/// Storage key and response field of the refresh token.
	pub token_name: Option<String>,
	/// Upper bound on one refresh exchange in milliseconds; `0` disables it.
	pub refresh_timeout_ms: Option<u64>,
	/// Custom refresh-token source.
	#[serde(skip)]
	pub refresh_token_getter: Option<Arc<dyn TokenGetter>>,
	/// Custom handler for the refresh response.
	#[serde(skip)]
	pub token_setter: Option<Arc<dyn TokenSetter>>,
}
impl RefreshOptions {
	/// Creates options targeting `end_point`.
	pub fn new(end_point: impl Into<String>) -> Self {
		Self { end_point: Some(end_point.into()), ..Default::default() }
	}

	/// Overrides the refresh body.
	pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
		self.payload = Some(payload);

		self
	}

	/// Overrides the safety margin.
	pub fn with_before_seconds(mut self, seconds: i64) -> Self {
		self.before_seconds = Some(seconds);

		self
	}

	/// Overrides the refresh-token name.
	pub fn with_token_name(mut self, name: impl Into<String>) -> Self {
		self.token_name = Some(name.into());

		self
	}

	/// Bounds every refresh exchange by `limit`.
	pub fn with_refresh_timeout(mut self, limit: StdDuration) -> Self {
		self.refresh_timeout_ms = Some(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX));

		self
	}

	/// Lets a refresh exchange run for as long as the transport takes.
	pub fn without_refresh_timeout(mut self) -> Self {
		self.refresh_timeout_ms = Some(0);

		self
	}

	/// Replaces the refresh-token source.
	pub fn with_refresh_token_getter(mut self, getter: impl 'static + TokenGetter) -> Self {
		self.refresh_token_getter = Some(Arc::new(getter));

		self
	}

	/// Replaces the refresh-response handler.
	pub fn with_token_setter(mut self, setter: impl 'static + TokenSetter) -> Self {
		self.token_setter = Some(Arc::new(setter));

		self
	}
}
impl Debug for RefreshOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshOptions")
			.field("end_point", &self.end_point)
			.field("payload", &self.payload)
			.field("before_seconds", &self.before_seconds)
			.field("token_name", &self.token_name)
			.field("refresh_timeout_ms", &self.refresh_timeout_ms)
			.field("refresh_token_getter_set", &self.refresh_token_getter.is_some())
			.field("token_setter_set", &self.token_setter.is_some())
			.finish()
	}
}

/// Fully resolved refresh policy.
#[derive(Clone)]
pub struct RefreshConfig {
	/// Refresh endpoint; the coordinator refuses to start without one.
	pub end_point: Option<String>,
	/// JSON body of the refresh call.
	pub payload: serde_json::Value,
	/// Safety margin in seconds.
	pub before_seconds: i64,
	/// Storage key and response field of the refresh token.
	pub token_name: String,
	/// Upper bound on one refresh exchange.
	pub refresh_timeout: Option<StdDuration>,
	/// Source of the current refresh token.
	pub refresh_token_getter: Arc<dyn TokenGetter>,
	/// Handler persisting tokens from the refresh response.
	pub token_setter: Arc<dyn TokenSetter>,
}
impl RefreshConfig {
	/// Default safety margin.
	pub const DEFAULT_BEFORE_SECONDS: i64 = 600;
	/// Default refresh-token storage key.
	pub const DEFAULT_TOKEN_NAME: &'static str = "refresh_token";
	/// Default bound on one refresh exchange.
	pub const DEFAULT_REFRESH_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Fills every unset field of `options` with its default.
	///
	/// The default capabilities read and write `store`; the setter also persists the access
	/// token under `auth.token_name`.
	pub fn resolve(
		options: &RefreshOptions,
		auth: &AuthConfig,
		store: &Arc<dyn KeyValueStore>,
	) -> Self {
		let token_name =
			options.token_name.clone().unwrap_or_else(|| Self::DEFAULT_TOKEN_NAME.to_owned());
		let refresh_token_getter = options.refresh_token_getter.clone().unwrap_or_else(|| {
			Arc::new(StoreTokenGetter::new(Arc::clone(store), token_name.clone()))
		});
		let token_setter = options.token_setter.clone().unwrap_or_else(|| {
			Arc::new(StoreTokenSetter::new(
				Arc::clone(store),
				token_name.clone(),
				auth.token_name.clone(),
			))
		});
		let refresh_timeout = match options.refresh_timeout_ms {
			None => Some(Self::DEFAULT_REFRESH_TIMEOUT),
			Some(0) => None,
			Some(ms) => Some(StdDuration::from_millis(ms)),
		};

		Self {
			end_point: options.end_point.clone(),
			payload: options
				.payload
				.clone()
				.unwrap_or_else(|| serde_json::Value::Object(Default::default())),
			before_seconds: options.before_seconds.unwrap_or(Self::DEFAULT_BEFORE_SECONDS),
			token_name,
			refresh_timeout,
			refresh_token_getter,
			token_setter,
		}
	}

	/// Safety margin as a [`Duration`].
	pub fn before(&self) -> Duration {
		Duration::seconds(self.before_seconds)
	}
}
impl Debug for RefreshConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshConfig")
			.field("end_point", &self.end_point)
			.field("payload", &self.payload)
			.field("before_seconds", &self.before_seconds)
			.field("token_name", &self.token_name)
			.field("refresh_timeout", &self.refresh_timeout)
			.finish()
	}
}
