//! Optional observability helpers for the request gate.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `jwt_refresh.gate` with a `stage` field
//!   (`request` or `refresh`) and `warn` events for failed refreshes.
//! - Enable `metrics` to increment the `jwt_refresh_gate_total` counter once per gated
//!   request, labeled by `outcome`.

mod counter;
mod span;

pub use counter::*;
pub use span::*;

// self
use crate::_prelude::*;

/// Stages of the gate that run inside their own span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateStage {
	/// A caller's request, from the token check to the transport response.
	Request,
	/// The single refresh exchange performed by the refresher.
	Refresh,
}
impl GateStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GateStage::Request => "request",
			GateStage::Refresh => "refresh",
		}
	}
}
impl Display for GateStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How the gate let a request through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GateOutcome {
	/// Token was valid (or absent) and no refresh was involved.
	PassThrough,
	/// This request performed the refresh.
	Refreshed,
	/// This request waited for another request's refresh.
	Coalesced,
	/// Gating failed and the request was not sent.
	Failed,
}
impl GateOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GateOutcome::PassThrough => "pass_through",
			GateOutcome::Refreshed => "refreshed",
			GateOutcome::Coalesced => "coalesced",
			GateOutcome::Failed => "failed",
		}
	}
}
impl Display for GateOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
