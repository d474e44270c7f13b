//! Shared refresh state: the single-flight flag, its waiter queue, and the broadcast channels.

// crates.io
use tokio::sync::{broadcast, oneshot};
// self
use crate::{_prelude::*, token::TokenSecret};

const CHANNEL_CAPACITY: usize = 16;

/// Result of trying to enter a refresh cycle.
#[derive(Debug)]
pub(crate) enum Gate {
	/// No refresh was running; the holder performs it and releases the state on drop.
	Refresher(RefreshGuard),
	/// A refresh is running; the receiver resolves once it ends, whatever its outcome.
	Waiter(oneshot::Receiver<()>),
}

#[derive(Debug, Default)]
struct Phase {
	refreshing: bool,
	waiters: Vec<oneshot::Sender<()>>,
}

/// Refresh state shared by a coordinator and all of its clones.
#[derive(Debug)]
pub(crate) struct RefreshState {
	phase: Mutex<Phase>,
	phases: broadcast::Sender<bool>,
	refresh_tokens: broadcast::Sender<Option<TokenSecret>>,
}
impl RefreshState {
	pub(crate) fn is_refreshing(&self) -> bool {
		self.phase.lock().refreshing
	}

	pub(crate) fn subscribe_phases(&self) -> broadcast::Receiver<bool> {
		self.phases.subscribe()
	}

	pub(crate) fn subscribe_refresh_tokens(&self) -> broadcast::Receiver<Option<TokenSecret>> {
		self.refresh_tokens.subscribe()
	}

	/// Checks the flag and either claims the cycle or queues a waiter, in one critical
	/// section.
	pub(crate) fn enter(self: &Arc<Self>) -> Gate {
		let mut phase = self.phase.lock();

		if phase.refreshing {
			let (tx, rx) = oneshot::channel();

			phase.waiters.push(tx);

			return Gate::Waiter(rx);
		}

		phase.refreshing = true;

		// A send only fails when nobody subscribed.
		let _ = self.phases.send(true);

		Gate::Refresher(RefreshGuard { state: Arc::clone(self) })
	}

	pub(crate) fn publish_refresh_token(&self, token: Option<TokenSecret>) {
		let _ = self.refresh_tokens.send(token);
	}

	fn release(&self) {
		let waiters = {
			let mut phase = self.phase.lock();

			phase.refreshing = false;

			let _ = self.phases.send(false);

			std::mem::take(&mut phase.waiters)
		};

		for waiter in waiters {
			// The waiting request may have been dropped already.
			let _ = waiter.send(());
		}
	}
}
impl Default for RefreshState {
	fn default() -> Self {
		Self {
			phase: Default::default(),
			phases: broadcast::channel(CHANNEL_CAPACITY).0,
			refresh_tokens: broadcast::channel(CHANNEL_CAPACITY).0,
		}
	}
}

/// Ends the refresh cycle when dropped, including when the refresher is cancelled.
#[derive(Debug)]
pub(crate) struct RefreshGuard {
	state: Arc<RefreshState>,
}
impl Drop for RefreshGuard {
	fn drop(&mut self) {
		self.state.release();
	}
}
