use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::engine::{MatchEngine, Viewpoint};
use crate::error::RadarError;
use crate::types::{
    Intent, MatchState, MatchSummary, RadarResult, RuntimeEvent, Snapshot, StepReport,
};

#[derive(Clone, Debug)]
pub enum DriverUpdate {
    /// Latest view of the match. Skipped while the receiver is full.
    State(Snapshot),
    /// Events raised by one step, in order. Always delivered.
    Events(Vec<RuntimeEvent>),
    /// Last update of the match. Always delivered.
    Ended(MatchSummary),
}

struct DriverState {
    engine: MatchEngine,
    held_intent: Intent,
    started_at: Instant,
}

impl DriverState {
    fn now_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// Shared access to a running match. Every call takes the same lock as the
/// two timer tasks, so a tick is never observed half-applied. The lock is
/// never held across a send to the update receiver.
#[derive(Clone)]
pub struct MatchHandle {
    inner: Arc<Mutex<DriverState>>,
}

impl MatchHandle {
    fn new(engine: MatchEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DriverState {
                engine,
                held_intent: Intent::NONE,
                started_at: Instant::now(),
            })),
        }
    }

    /// Replaces the key state that is resubmitted before every tick.
    pub async fn set_held_intent(&self, dx: i32, dy: i32) {
        self.inner.lock().await.held_intent = Intent::new(dx, dy);
    }

    pub async fn activate_radar(&self) -> Result<RadarResult, RadarError> {
        let mut guard = self.inner.lock().await;
        let now_ms = guard.now_ms();
        guard.engine.activate_radar(now_ms)
    }

    pub async fn radar_ready_in_ms(&self) -> u64 {
        let guard = self.inner.lock().await;
        guard.engine.radar_ready_in_ms(guard.now_ms())
    }

    pub async fn radar_charge(&self) -> f64 {
        let guard = self.inner.lock().await;
        guard.engine.radar_charge(guard.now_ms())
    }

    /// Snapshot without draining pending events; those belong to the update
    /// stream.
    pub async fn snapshot(&self, viewpoint: Viewpoint) -> Snapshot {
        self.inner
            .lock()
            .await
            .engine
            .build_snapshot(viewpoint, false)
    }

    pub async fn state(&self) -> MatchState {
        self.inner.lock().await.engine.state()
    }

    pub async fn is_ended(&self) -> bool {
        self.inner.lock().await.engine.is_ended()
    }
}

/// Runs one match on two periodic tasks, the one-second timer and the
/// simulation tick, plus a publisher that forwards their updates. Everything
/// stops once the match has ended or the update receiver is gone.
pub struct MatchDriver {
    handle: MatchHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl MatchDriver {
    pub fn spawn(
        engine: MatchEngine,
        viewpoint: Viewpoint,
        updates: mpsc::Sender<DriverUpdate>,
    ) -> Self {
        let tick_period = Duration::from_millis(engine.config.tick_interval_ms);
        let handle = MatchHandle::new(engine);
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();

        let publisher = tokio::spawn(publish(outbox_rx, updates));
        let second_task = {
            let handle = handle.clone();
            let outbox = outbox_tx.clone();
            tokio::spawn(async move {
                run_periodic(handle, outbox, viewpoint, Duration::from_secs(1), |state| {
                    state.engine.advance_second()
                })
                .await;
            })
        };
        let tick_task = {
            let handle = handle.clone();
            tokio::spawn(async move {
                run_periodic(handle, outbox_tx, viewpoint, tick_period, |state| {
                    let intent = state.held_intent;
                    state.engine.submit_intent(intent.dx, intent.dy);
                    state.engine.tick()
                })
                .await;
            })
        };

        Self {
            handle,
            tasks: vec![second_task, tick_task, publisher],
        }
    }

    pub fn handle(&self) -> MatchHandle {
        self.handle.clone()
    }

    pub fn stop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }

    /// Waits until the timer tasks and the publisher have finished.
    pub async fn join(mut self) {
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
    }
}

impl Drop for MatchDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_periodic<F>(
    handle: MatchHandle,
    outbox: mpsc::UnboundedSender<DriverUpdate>,
    viewpoint: Viewpoint,
    period: Duration,
    mut step: F,
) where
    F: FnMut(&mut DriverState) -> StepReport,
{
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let mut guard = handle.inner.lock().await;
        if guard.engine.is_ended() {
            return;
        }
        let report = step(&mut guard);

        // Queued under the lock so updates keep the order steps were applied
        // in. The outbox never blocks.
        let events = guard.engine.take_events();
        if !events.is_empty() && outbox.send(DriverUpdate::Events(events)).is_err() {
            return;
        }
        let snapshot = guard.engine.build_snapshot(viewpoint, false);
        if outbox.send(DriverUpdate::State(snapshot)).is_err() {
            return;
        }
        if let Some(summary) = report.summary {
            let _ = outbox.send(DriverUpdate::Ended(summary));
            return;
        }
    }
}

/// Forwards queued updates to the receiver. Snapshots are skipped while the
/// receiver is full; events and the final summary wait for room.
async fn publish(
    mut outbox: mpsc::UnboundedReceiver<DriverUpdate>,
    updates: mpsc::Sender<DriverUpdate>,
) {
    while let Some(update) = outbox.recv().await {
        match update {
            DriverUpdate::State(_) => match updates.try_send(update) {
                Ok(()) | Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Closed(_)) => return,
            },
            DriverUpdate::Events(_) => {
                if updates.send(update).await.is_err() {
                    return;
                }
            }
            DriverUpdate::Ended(_) => {
                if updates.send(update).await.is_err() {
                    log::debug!("match ended with no update receiver");
                }
                return;
            }
        }
    }
}
