use crate::config::schema::TimingConfig;
use crate::machine::{AnimationStep, ButtonStateMachine};
use crate::state::{ButtonId, LogicalState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Flickers the LED every short period and re-reads the remote state every
/// long period.
pub struct PeriodicAnimator {
    machine: Arc<ButtonStateMachine>,
    short_period: Duration,
    long_period: Duration,
}

impl PeriodicAnimator {
    pub fn new(machine: Arc<ButtonStateMachine>, timing: &TimingConfig) -> Self {
        Self {
            machine,
            short_period: timing.short_period(),
            long_period: timing.long_period(),
        }
    }

    /// Run one iteration and return the state left on display.
    pub async fn tick(&self, now: Instant) -> LogicalState {
        match self.machine.animate(now, self.long_period).await {
            AnimationStep::Advanced(state) => state,
            AnimationStep::PollDue => {
                debug!("long period elapsed, polling remote state");
                let state = self.machine.on_accept(ButtonId::None).await;
                self.machine.announce(&state.name().to_lowercase()).await;
                state
            }
        }
    }

    /// Tick until cancelled. An iteration always finishes before the next
    /// one starts; late ticks are delayed, not bunched.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.short_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "animator running: flicker every {:?}, poll every {:?}",
            self.short_period, self.long_period
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("animator shutting down");
                    return;
                }
                _ = interval.tick() => {
                    self.tick(Instant::now()).await;
                }
            }
        }
    }
}
