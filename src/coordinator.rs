//! Request gate that refreshes expiring access tokens with single-flight coalescing.
//!
//! Every request sent through [`Coordinator::request`] first reads the access token and
//! checks its expiry against the configured safety margin. A valid or absent token lets the
//! request through untouched. An expiring token makes the first caller the refresher: it
//! posts the refresh payload to the configured endpoint with the refresh token attached,
//! hands the response to the token setter, and then forwards its own request with the new
//! access token. Callers arriving while that refresh runs queue a one-shot continuation,
//! never issue a second refresh call, and re-check the token once the refresher finishes.
//!
//! The refresh state lives behind an `Arc` so clones of a coordinator share one cycle. The
//! state is released by a drop guard, so a failed, timed-out, or cancelled refresh always
//! returns the gate to idle.

mod metrics;
mod state;

pub use metrics::RefreshMetrics;

// crates.io
use ::http::{HeaderMap, HeaderValue, Method, header::CONTENT_TYPE};
use tokio::sync::broadcast;
// self
use crate::{
	_prelude::*,
	config::{AuthConfig, ConfigService, RefreshConfig},
	coordinator::state::{Gate, RefreshGuard, RefreshState},
	error::{ConfigError, RefreshError},
	http::{
		HeaderInjector, HttpRequest, HttpResponse, RequestOptions, RequestTarget, TokenInjector,
		Transport, apply_global_headers, header_map,
	},
	obs::{self, GateOutcome, GateSpan, GateStage},
	token::{ExpiryDecoder, JwtDecoder, TokenSecret},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Coordinator specialized for the crate's default reqwest transport.
pub type ReqwestCoordinator = Coordinator<ReqwestTransport>;

/// Gates outgoing requests on a fresh access token.
///
/// The coordinator owns the transport, the resolved configuration, and the shared refresh
/// state. Cloning is cheap and clones coordinate with each other; two coordinators built
/// separately over the same store do not.
pub struct Coordinator<T>
where
	T: ?Sized + Transport,
{
	/// Transport used for forwarded requests and for the refresh call.
	pub transport: Arc<T>,
	/// Shared counters for refresh cycles.
	pub metrics: Arc<RefreshMetrics>,
	refresh: RefreshConfig,
	auth: AuthConfig,
	end_point: Url,
	global_headers: HeaderMap,
	default_options: RequestOptions,
	decoder: Arc<dyn ExpiryDecoder>,
	injector: Arc<dyn TokenInjector>,
	state: Arc<RefreshState>,
}
impl<T> Coordinator<T>
where
	T: ?Sized + Transport,
{
	/// Creates a coordinator from resolved configuration and a transport.
	///
	/// `default_options` apply to every request built from a URL and to the refresh call.
	/// Fails with [`ConfigError::MissingEndpoint`] when no refresh endpoint is configured,
	/// and with other [`ConfigError`] variants for an unparsable endpoint or header.
	pub fn new(
		config: ConfigService,
		transport: impl Into<Arc<T>>,
		default_options: Option<RequestOptions>,
	) -> Result<Self> {
		let refresh = config.refresh_config().clone();
		let auth = config.auth_config().clone();
		let raw = refresh
			.end_point
			.as_deref()
			.filter(|end_point| !end_point.is_empty())
			.ok_or(ConfigError::MissingEndpoint)?;
		let end_point = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
			end_point: raw.to_owned(),
			source,
		})?;
		let global_headers = header_map(&auth.global_headers)?;
		let injector = HeaderInjector::from_config(&auth)?;

		Ok(Self {
			transport: transport.into(),
			metrics: Default::default(),
			refresh,
			auth,
			end_point,
			global_headers,
			default_options: default_options.unwrap_or_default(),
			decoder: Arc::new(JwtDecoder),
			injector: Arc::new(injector),
			state: Default::default(),
		})
	}

	/// Replaces the expiry decoder.
	pub fn with_decoder(mut self, decoder: impl 'static + ExpiryDecoder) -> Self {
		self.decoder = Arc::new(decoder);

		self
	}

	/// Replaces how tokens are attached to requests, for both access and refresh tokens.
	pub fn with_injector(mut self, injector: impl 'static + TokenInjector) -> Self {
		self.injector = Arc::new(injector);

		self
	}

	/// Resolved refresh policy.
	pub fn refresh_config(&self) -> &RefreshConfig {
		&self.refresh
	}

	/// Resolved access-token configuration.
	pub fn auth_config(&self) -> &AuthConfig {
		&self.auth
	}

	/// Whether a refresh cycle is running.
	pub fn is_refreshing(&self) -> bool {
		self.state.is_refreshing()
	}

	/// Subscribes to the refresh token read after every cycle; `None` when none is stored.
	pub fn subscribe_refresh_tokens(&self) -> broadcast::Receiver<Option<TokenSecret>> {
		self.state.subscribe_refresh_tokens()
	}

	/// Subscribes to refresh phases: `true` when a cycle starts, `false` when it ends.
	pub fn subscribe_refresh_state(&self) -> broadcast::Receiver<bool> {
		self.state.subscribe_phases()
	}

	/// Sends `target` once the access token is known to be fresh.
	///
	/// URL targets are built from the default options overlaid with `options` and default
	/// to `GET`. Full requests are sent as they are. Both receive the global headers and,
	/// when a token exists, the auth header.
	pub async fn request(
		&self,
		target: impl Into<RequestTarget>,
		options: Option<RequestOptions>,
	) -> Result<HttpResponse> {
		let target = target.into();
		let span = GateSpan::new(GateStage::Request);

		span.instrument(self.forward(target, options)).await
	}

	/// Sends a gated `GET`.
	pub async fn get(&self, url: Url) -> Result<HttpResponse> {
		self.request(url, Some(RequestOptions::new().with_method(Method::GET))).await
	}

	/// Sends a gated `POST` with `body`.
	pub async fn post(&self, url: Url, body: impl Into<Vec<u8>>) -> Result<HttpResponse> {
		self.request(url, Some(RequestOptions::new().with_method(Method::POST).with_body(body)))
			.await
	}

	/// Sends a gated `PUT` with `body`.
	pub async fn put(&self, url: Url, body: impl Into<Vec<u8>>) -> Result<HttpResponse> {
		self.request(url, Some(RequestOptions::new().with_method(Method::PUT).with_body(body)))
			.await
	}

	/// Sends a gated `PATCH` with `body`.
	pub async fn patch(&self, url: Url, body: impl Into<Vec<u8>>) -> Result<HttpResponse> {
		self.request(url, Some(RequestOptions::new().with_method(Method::PATCH).with_body(body)))
			.await
	}

	/// Sends a gated `DELETE`.
	pub async fn delete(&self, url: Url) -> Result<HttpResponse> {
		self.request(url, Some(RequestOptions::new().with_method(Method::DELETE))).await
	}

	/// Sends a gated `HEAD`.
	pub async fn head(&self, url: Url) -> Result<HttpResponse> {
		self.request(url, Some(RequestOptions::new().with_method(Method::HEAD))).await
	}

	async fn forward(
		&self,
		target: RequestTarget,
		options: Option<RequestOptions>,
	) -> Result<HttpResponse> {
		let token = match self.authorize().await {
			Ok((token, outcome)) => {
				obs::record_gate_outcome(outcome);

				token
			},
			Err(e) => {
				obs::record_gate_outcome(GateOutcome::Failed);

				return Err(e);
			},
		};
		let request = self.prepare(target, options.as_ref(), token.as_ref())?;

		Ok(self.transport.send(request).await?)
	}

	/// Runs the gate until the request may proceed, returning the token to attach.
	async fn authorize(&self) -> Result<(Option<TokenSecret>, GateOutcome)> {
		let mut waited = false;

		loop {
			let Some(token) = self.access_token().await? else {
				return self.anonymous(GateOutcome::PassThrough);
			};

			if !self.decoder.is_expired(token.expose(), self.refresh.before())? {
				let outcome = if waited { GateOutcome::Coalesced } else { GateOutcome::PassThrough };

				return Ok((Some(token), outcome));
			}

			match self.state.enter() {
				Gate::Refresher(guard) => {
					self.refresh_tokens(guard).await?;

					return match self.access_token().await? {
						Some(token) => Ok((Some(token), GateOutcome::Refreshed)),
						None => self.anonymous(GateOutcome::Refreshed),
					};
				},
				Gate::Waiter(release) => {
					self.metrics.record_coalesced();

					waited = true;

					// A closed channel means the refresher is gone; re-checking is still right.
					let _ = release.await;
				},
			}
		}
	}

	fn anonymous(&self, outcome: GateOutcome) -> Result<(Option<TokenSecret>, GateOutcome)> {
		if self.auth.require_token {
			return Err(Error::MissingAccessToken);
		}

		Ok((None, outcome))
	}

	async fn access_token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.auth.token_getter.token().await?.filter(|token| !token.is_empty()))
	}

	async fn refresh_token(&self) -> Result<Option<TokenSecret>> {
		Ok(self.refresh.refresh_token_getter.token().await?.filter(|token| !token.is_empty()))
	}

	/// Performs one refresh cycle and ends it, whatever the outcome.
	async fn refresh_tokens(&self, guard: RefreshGuard) -> Result<()> {
		self.metrics.record_attempt();

		let span = GateSpan::new(GateStage::Refresh);
		let exchange = span.instrument(self.exchange());
		// The bound needs a Tokio timer; other executors run the exchange unbounded.
		let result = match self.refresh.refresh_timeout {
			Some(limit) if tokio::runtime::Handle::try_current().is_ok() =>
				tokio::time::timeout(limit, exchange)
					.await
					.unwrap_or_else(|_| Err(RefreshError::TimedOut { limit }.into())),
			Some(limit) => {
				obs::refresh_timeout_unavailable(limit);

				exchange.await
			},
			None => exchange.await,
		};

		drop(guard);

		self.state.publish_refresh_token(self.refresh_token().await.ok().flatten());

		match &result {
			Ok(()) => self.metrics.record_success(),
			Err(e) => {
				self.metrics.record_failure();
				obs::refresh_failed(e);
			},
		}

		result
	}

	async fn exchange(&self) -> Result<()> {
		let refresh_token = self.refresh_token().await?;
		let payload = serde_json::to_vec(&self.refresh.payload).map_err(ConfigError::from)?;
		let overrides = RequestOptions::new()
			.with_method(Method::POST)
			.with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
			.with_body(payload);
		let mut request =
			self.default_options.merge(&overrides).build(&self.end_point, Method::POST)?;

		apply_global_headers(&mut request, &self.global_headers);

		match &refresh_token {
			Some(token) => self.injector.attach_token(&mut request, token)?,
			None => obs::missing_refresh_token(),
		}

		let response = self.transport.send(request).await.map_err(RefreshError::from)?;

		if !response.status().is_success() {
			return Err(RefreshError::Status { status: response.status().as_u16() }.into());
		}

		match self.refresh.token_setter.set_tokens(&response).await {
			Ok(true) => Ok(()),
			Ok(false) => Err(RefreshError::Rejected.into()),
			Err(e) => Err(RefreshError::Setter { source: Box::new(e) }.into()),
		}
	}

	fn prepare(
		&self,
		target: RequestTarget,
		options: Option<&RequestOptions>,
		token: Option<&TokenSecret>,
	) -> Result<HttpRequest> {
		let mut request = match target {
			RequestTarget::Url(url) => {
				let options = match options {
					Some(options) => self.default_options.merge(options),
					None => self.default_options.clone(),
				};

				options.build(&url, Method::GET)?
			},
			RequestTarget::Request(request) => request,
		};

		apply_global_headers(&mut request, &self.global_headers);

		if let Some(token) = token {
			self.injector.attach_token(&mut request, token)?;
		}

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl Coordinator<ReqwestTransport> {
	/// Creates a coordinator backed by a default reqwest client.
	pub fn with_reqwest(
		config: ConfigService,
		default_options: Option<RequestOptions>,
	) -> Result<Self> {
		Self::new(config, ReqwestTransport::default(), default_options)
	}
}
impl<T> Clone for Coordinator<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			transport: Arc::clone(&self.transport),
			metrics: Arc::clone(&self.metrics),
			refresh: self.refresh.clone(),
			auth: self.auth.clone(),
			end_point: self.end_point.clone(),
			global_headers: self.global_headers.clone(),
			default_options: self.default_options.clone(),
			decoder: Arc::clone(&self.decoder),
			injector: Arc::clone(&self.injector),
			state: Arc::clone(&self.state),
		}
	}
}
impl<T> Debug for Coordinator<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Coordinator")
			.field("end_point", &self.end_point.as_str())
			.field("refresh", &self.refresh)
			.field("auth", &self.auth)
			.field("is_refreshing", &self.is_refreshing())
			.finish()
	}
}
