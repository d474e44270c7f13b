//! Crate-level error types shared by the resolver, the coordinator, stores, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The refresh exchange did not produce new tokens.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Transport failure while forwarding a gated request.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Access token could not be decoded.
	#[error(transparent)]
	Token(#[from] crate::token::TokenDecodeError),

	/// No access token is available and the configuration requires one.
	#[error("No access token is present.")]
	MissingAccessToken,
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] ::http::Error),
	/// Refresh configuration has no endpoint.
	#[error("Refresh configuration is missing an endpoint.")]
	MissingEndpoint,
	/// Refresh endpoint cannot be parsed as an absolute URL.
	#[error("Refresh endpoint `{end_point}` is invalid.")]
	InvalidEndpoint {
		/// Raw endpoint string.
		end_point: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name cannot be used on an HTTP request.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
		/// Underlying parsing failure.
		#[source]
		source: ::http::header::InvalidHeaderName,
	},
	/// Header value cannot be used on an HTTP request.
	#[error("Value for header `{name}` is invalid.")]
	InvalidHeaderValue {
		/// Header the value was meant for.
		name: String,
		/// Underlying parsing failure.
		#[source]
		source: ::http::header::InvalidHeaderValue,
	},
	/// Refresh payload cannot be serialized.
	#[error("Refresh payload cannot be serialized.")]
	Payload(#[from] serde_json::Error),
}

/// Failures of a single refresh exchange.
///
/// Every variant leaves the coordinator idle again, so the next request may retry.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// Token setter could not extract new tokens from the response.
	#[error("Impossible to get new token.")]
	Rejected,
	/// Token setter failed while handling the response.
	#[error("Token setter failed.")]
	Setter {
		/// Failure reported by the setter.
		#[source]
		source: Box<Error>,
	},
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint responded with HTTP {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Transport failed while calling the refresh endpoint.
	#[error("Transport failed while calling the refresh endpoint.")]
	Transport(#[source] TransportError),
	/// Refresh exchange did not finish within the configured bound.
	#[error("Refresh exchange exceeded {limit:?}.")]
	TimedOut {
		/// Configured timeout.
		limit: std::time::Duration,
	},
}
impl From<TransportError> for RefreshError {
	fn from(e: TransportError) -> Self {
		Self::Transport(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
