//! Token getter and setter capabilities.
//!
//! Every capability returns a boxed future, even when the value is known immediately, so
//! the coordinator never branches on whether a getter or setter was synchronous. Closure
//! adapters cover both shapes.

// self
use crate::{
	_prelude::*,
	http::HttpResponse,
	store::KeyValueStore,
	token::TokenSecret,
};

/// Boxed future returned by token capabilities.
pub type CapabilityFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Produces the current value of a token.
pub trait TokenGetter
where
	Self: Send + Sync,
{
	/// Resolves with the token, or `None` when no token is available.
	fn token(&self) -> CapabilityFuture<'_, Option<TokenSecret>>;
}

/// Extracts and persists new tokens from a refresh response.
pub trait TokenSetter
where
	Self: Send + Sync,
{
	/// Resolves with `true` once both tokens are persisted, `false` when the response did not
	/// carry them. An error result counts as a failed refresh as well.
	fn set_tokens<'a>(&'a self, response: &'a HttpResponse) -> CapabilityFuture<'a, bool>;
}

/// [`TokenGetter`] backed by a closure returning the token immediately.
pub struct FnTokenGetter<F>(F);
impl<F> FnTokenGetter<F>
where
	F: Fn() -> Option<String> + Send + Sync,
{
	/// Wraps `f`.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F> TokenGetter for FnTokenGetter<F>
where
	F: Fn() -> Option<String> + Send + Sync,
{
	fn token(&self) -> CapabilityFuture<'_, Option<TokenSecret>> {
		let value = (self.0)().map(TokenSecret::from);

		Box::pin(async move { Ok(value) })
	}
}

/// [`TokenGetter`] backed by a closure returning a future.
pub struct AsyncFnTokenGetter<F>(F);
impl<F, Fut> AsyncFnTokenGetter<F>
where
	F: Fn() -> Fut + Send + Sync,
	Fut: 'static + Future<Output = Result<Option<String>>> + Send,
{
	/// Wraps `f`.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, Fut> TokenGetter for AsyncFnTokenGetter<F>
where
	F: Fn() -> Fut + Send + Sync,
	Fut: 'static + Future<Output = Result<Option<String>>> + Send,
{
	fn token(&self) -> CapabilityFuture<'_, Option<TokenSecret>> {
		let pending = (self.0)();

		Box::pin(async move { Ok(pending.await?.map(TokenSecret::from)) })
	}
}

/// [`TokenSetter`] backed by a closure answering immediately.
pub struct FnTokenSetter<F>(F);
impl<F> FnTokenSetter<F>
where
	F: Fn(&HttpResponse) -> bool + Send + Sync,
{
	/// Wraps `f`.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F> TokenSetter for FnTokenSetter<F>
where
	F: Fn(&HttpResponse) -> bool + Send + Sync,
{
	fn set_tokens<'a>(&'a self, response: &'a HttpResponse) -> CapabilityFuture<'a, bool> {
		let stored = (self.0)(response);

		Box::pin(async move { Ok(stored) })
	}
}

/// [`TokenSetter`] backed by a closure returning a future; a failed future is a failed
/// refresh.
pub struct AsyncFnTokenSetter<F>(F);
impl<F, Fut> AsyncFnTokenSetter<F>
where
	F: Fn(&HttpResponse) -> Fut + Send + Sync,
	Fut: 'static + Future<Output = Result<()>> + Send,
{
	/// Wraps `f`.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, Fut> TokenSetter for AsyncFnTokenSetter<F>
where
	F: Fn(&HttpResponse) -> Fut + Send + Sync,
	Fut: 'static + Future<Output = Result<()>> + Send,
{
	fn set_tokens<'a>(&'a self, response: &'a HttpResponse) -> CapabilityFuture<'a, bool> {
		let pending = (self.0)(response);

		Box::pin(async move { pending.await.map(|_| true) })
	}
}

/// Default getter reading a token from the injected store.
#[derive(Clone)]
pub struct StoreTokenGetter {
	store: Arc<dyn KeyValueStore>,
	key: String,
}
impl StoreTokenGetter {
	/// Reads `key` from `store` on every call.
	pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
		Self { store, key: key.into() }
	}
}
impl TokenGetter for StoreTokenGetter {
	fn token(&self) -> CapabilityFuture<'_, Option<TokenSecret>> {
		let value = self.store.get(&self.key);

		Box::pin(async move { Ok(value?.map(TokenSecret::from)) })
	}
}
impl Debug for StoreTokenGetter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StoreTokenGetter").field("key", &self.key).finish()
	}
}

/// Default setter persisting both tokens from a JSON refresh response.
///
/// A body that is not a JSON object, or that lacks either token as a non-empty string,
/// clears both stored tokens and reports `false`.
#[derive(Clone)]
pub struct StoreTokenSetter {
	store: Arc<dyn KeyValueStore>,
	refresh_key: String,
	access_key: String,
}
impl StoreTokenSetter {
	/// Persists the refresh token under `refresh_key` and the access token under
	/// `access_key`; the same keys name the fields read from the response body.
	pub fn new(
		store: Arc<dyn KeyValueStore>,
		refresh_key: impl Into<String>,
		access_key: impl Into<String>,
	) -> Self {
		Self { store, refresh_key: refresh_key.into(), access_key: access_key.into() }
	}

	fn apply(&self, body: &[u8]) -> Result<bool> {
		let fields = serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(body).ok();
		let tokens = fields.as_ref().and_then(|fields| {
			Some((text_field(fields, &self.refresh_key)?, text_field(fields, &self.access_key)?))
		});
		let Some((refresh, access)) = tokens else {
			self.store.remove(&self.refresh_key)?;
			self.store.remove(&self.access_key)?;

			return Ok(false);
		};

		self.store.set(&self.refresh_key, refresh)?;
		self.store.set(&self.access_key, access)?;

		Ok(true)
	}
}
impl TokenSetter for StoreTokenSetter {
	fn set_tokens<'a>(&'a self, response: &'a HttpResponse) -> CapabilityFuture<'a, bool> {
		let outcome = self.apply(response.body());

		Box::pin(async move { outcome })
	}
}
impl Debug for StoreTokenSetter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StoreTokenSetter")
			.field("refresh_key", &self.refresh_key)
			.field("access_key", &self.access_key)
			.finish()
	}
}

fn text_field<'a>(
	fields: &'a serde_json::Map<String, serde_json::Value>,
	key: &str,
) -> Option<&'a str> {
	fields.get(key).and_then(serde_json::Value::as_str).filter(|value| !value.is_empty())
}
