// self
use crate::{_prelude::*, obs::GateStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedGate<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedGate<F> = F;

/// A span builder used by the coordinator.
#[derive(Clone, Debug)]
pub struct GateSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GateSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: GateStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("jwt_refresh.gate", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedGate<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

pub(crate) fn refresh_failed(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%error, "token refresh failed");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

pub(crate) fn missing_refresh_token() {
	#[cfg(feature = "tracing")]
	tracing::warn!("no refresh token available; calling the refresh endpoint without one");
}

pub(crate) fn refresh_timeout_unavailable(limit: std::time::Duration) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		limit_ms = limit.as_millis() as u64,
		"no Tokio runtime available; running the refresh without its timeout"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = limit;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = GateSpan::new(GateStage::Refresh);
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
