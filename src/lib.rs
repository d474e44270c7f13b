//! Bearer-token HTTP gate that refreshes expiring JWTs before forwarding requests and
//! coalesces concurrent refreshes into a single call.
//!
//! Build a [`config::ConfigService`] from [`config::RefreshOptions`] and
//! [`config::AuthOptions`], hand it to [`coordinator::Coordinator::new`] together with a
//! [`http::Transport`], and send every protected request through
//! [`coordinator::Coordinator::request`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod obs;
pub mod store;
pub mod token;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
