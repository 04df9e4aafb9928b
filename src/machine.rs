use crate::device::filter::EdgeFilter;
use crate::device::led::LedPattern;
use crate::device::Hardware;
use crate::event::EdgeEvent;
use crate::notify::Notify;
use crate::remote::RemoteConnection;
use crate::state::{ButtonId, LogicalState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Outcome of one animator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStep {
    /// The LED moved to the next phase of the current state.
    Advanced(LogicalState),
    /// The long interval elapsed; the caller should re-read the remote state.
    PollDue,
}

/// Everything guarded by the state lock.
struct Inner {
    state: LogicalState,
    filter: EdgeFilter,
    hardware: Box<dyn Hardware>,
    /// Unset until the first full poll.
    last_poll: Option<Instant>,
}

impl Inner {
    /// Commit `state` and display it.
    fn show(&mut self, state: LogicalState) {
        self.state = state;
        self.hardware.show(LedPattern::for_state(state));
    }
}

/// Owns the displayed state, the debounce records and the hardware.
///
/// The state lock is only ever held for in-memory work and GPIO access.
/// Remote calls happen between two short critical sections so a slow request
/// leaves `Pending` on display without blocking the animator or other presses.
pub struct ButtonStateMachine {
    inner: Mutex<Inner>,
    remote: Arc<RemoteConnection>,
    notifier: Arc<dyn Notify>,
}

impl ButtonStateMachine {
    /// Take ownership of the hardware and show `Pending` until the first
    /// remote reading arrives.
    pub fn new(
        hardware: Box<dyn Hardware>,
        remote: Arc<RemoteConnection>,
        notifier: Arc<dyn Notify>,
        debounce_us: u32,
    ) -> Self {
        let mut inner = Inner {
            state: LogicalState::PENDING,
            filter: EdgeFilter::new(debounce_us),
            hardware,
            last_poll: None,
        };
        inner.show(LogicalState::PENDING);

        Self {
            inner: Mutex::new(inner),
            remote,
            notifier,
        }
    }

    #[must_use]
    pub fn remote(&self) -> &Arc<RemoteConnection> {
        &self.remote
    }

    /// Debounce a hardware edge. Returns the identity to act on, or `None`
    /// if the edge was a bounce.
    pub async fn intake(&self, edge: EdgeEvent) -> Option<ButtonId> {
        let mut inner = self.inner.lock().await;
        let levels = inner.hardware.read_buttons();
        let accepted = inner.filter.accept(edge.button, edge.tick, levels);
        if let Some(button) = accepted {
            debug!("accepted {button:?} (edge on {:?} at {})", edge.button, edge.tick);
        }
        accepted
    }

    /// Act on an accepted press: show `Pending`, run the remote action, then
    /// commit and display its result and announce the press.
    pub async fn on_accept(&self, button: ButtonId) -> LogicalState {
        self.force_update(LogicalState::PENDING).await;

        let result = self.remote.perform(button).await;

        self.force_update(result).await;
        info!("{button:?} → {result}");

        if let Some(message) = button.notification() {
            self.notifier.notify(message).await;
        }
        result
    }

    pub async fn state(&self) -> LogicalState {
        self.inner.lock().await.state
    }

    /// Set and display `state` unconditionally.
    pub async fn force_update(&self, state: LogicalState) {
        self.inner.lock().await.show(state);
    }

    /// One animator step, under a single hold of the lock: either flag a
    /// full poll (and restart the long interval) or advance the phase.
    pub async fn animate(&self, now: Instant, long_period: Duration) -> AnimationStep {
        let mut inner = self.inner.lock().await;

        let due = inner
            .last_poll
            .map_or(true, |last| now.saturating_duration_since(last) > long_period);
        if due {
            inner.last_poll = Some(now);
            return AnimationStep::PollDue;
        }

        let next = inner.state.advance();
        inner.show(next);
        AnimationStep::Advanced(next)
    }

    pub async fn announce(&self, message: &str) {
        self.notifier.notify(message).await;
    }

    /// Switch the LED off. Used on shutdown only; the logical state is kept.
    pub async fn lights_out(&self) {
        self.inner.lock().await.hardware.show(LedPattern::OFF);
    }
}
