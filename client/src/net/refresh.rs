//! Single-flight access-token refresh.
//!
//! DESIGN
//! ======
//! At most one refresh is outstanding per gateway. The first request to see
//! a 401 installs a shared handle while holding the slot lock, and only then
//! can the refresh task run to completion; every later request that sees a
//! 401 before the task settles clones that handle instead of starting its
//! own. The task clears the slot itself (matching generation only), so a
//! waiter that is dropped mid-await neither cancels the refresh nor leaves a
//! stale handle behind.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;

use std::future::Future;
use std::sync::Mutex;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// Why a refresh did not produce new tokens. Broadcast to every waiter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RefreshFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl RefreshFailure {
    pub(crate) fn missing_token() -> Self {
        Self { status: None, message: "No refresh token available".to_owned() }
    }

    pub(crate) fn session_ended() -> Self {
        Self { status: None, message: "Session expired".to_owned() }
    }

    pub(crate) fn rejected(status: u16) -> Self {
        Self { status: Some(status), message: "Failed to refresh token".to_owned() }
    }

    pub(crate) fn other(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into() }
    }
}

pub type RefreshOutcome = Result<(), RefreshFailure>;
pub type RefreshHandle = Shared<BoxFuture<'static, RefreshOutcome>>;

struct InFlight {
    generation: u64,
    handle: RefreshHandle,
}

#[derive(Default)]
struct Slot {
    next_generation: u64,
    in_flight: Option<InFlight>,
}

#[derive(Default)]
pub struct RefreshCoordinator {
    slot: Mutex<Slot>,
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a refresh is currently outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Join the outstanding refresh, or spawn `start()` as the new one.
    ///
    /// `start` is only invoked when no refresh is in flight. Must be called
    /// from within a tokio runtime.
    pub fn join_or_start<F, Fut>(self: &std::sync::Arc<Self>, start: F) -> RefreshHandle
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RefreshOutcome> + Send + 'static,
    {
        let mut slot = self.lock();
        if let Some(in_flight) = slot.in_flight.as_ref() {
            tracing::debug!(generation = in_flight.generation, "joining in-flight token refresh");
            return in_flight.handle.clone();
        }

        let generation = slot.next_generation;
        slot.next_generation += 1;

        let coordinator = std::sync::Arc::clone(self);
        let work = start();
        let task = tokio::spawn(async move {
            let outcome = work.await;
            coordinator.settle(generation);
            outcome
        });

        let handle = async move {
            task.await
                .unwrap_or_else(|e| Err(RefreshFailure::other(format!("refresh task failed: {e}"))))
        }
        .boxed()
        .shared();

        slot.in_flight = Some(InFlight { generation, handle: handle.clone() });
        handle
    }

    fn settle(&self, generation: u64) {
        let mut slot = self.lock();
        if slot.in_flight.as_ref().is_some_and(|f| f.generation == generation) {
            slot.in_flight = None;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
