//! Configuration resolver merging caller settings with defaults.
//!
//! [`ConfigService`] owns the injected [`KeyValueStore`] and resolves [`RefreshOptions`] and
//! [`AuthOptions`] into [`RefreshConfig`] and [`AuthConfig`]. Resolution only reads the
//! options, so resolving the same options again yields an equivalent configuration.

pub mod auth;
pub mod capability;
pub mod refresh;

pub use auth::*;
pub use capability::*;
pub use refresh::*;

// self
use crate::{_prelude::*, store::KeyValueStore};

/// Resolved refresh and access-token configuration plus the store the defaults use.
#[derive(Clone)]
pub struct ConfigService {
	refresh: RefreshConfig,
	auth: AuthConfig,
	store: Arc<dyn KeyValueStore>,
}
impl ConfigService {
	/// Resolves `refresh` and `auth` against `store`.
	pub fn new(refresh: RefreshOptions, auth: AuthOptions, store: Arc<dyn KeyValueStore>) -> Self {
		let auth = AuthConfig::resolve(&auth, &store);
		let refresh = RefreshConfig::resolve(&refresh, &auth, &store);

		Self { refresh, auth, store }
	}

	/// Resolved refresh policy.
	pub fn refresh_config(&self) -> &RefreshConfig {
		&self.refresh
	}

	/// Resolved access-token configuration.
	pub fn auth_config(&self) -> &AuthConfig {
		&self.auth
	}

	/// Store backing the default getters and setter.
	pub fn store(&self) -> &Arc<dyn KeyValueStore> {
		&self.store
	}
}
impl Debug for ConfigService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfigService")
			.field("refresh", &self.refresh)
			.field("auth", &self.auth)
			.finish()
	}
}
