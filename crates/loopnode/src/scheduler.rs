//! Fixed-rate driver for all nodes.
//!
//! ```text
//!  t=0        t=I        t=2I
//!  |cycle 1|  |cycle 2|  |cycle 3|      I = tick interval
//!  a b c R    a b c R    a b c R        nodes ticked in order, then render
//! ```
//!
//! The first cycle starts immediately. Later cycles start every interval
//! counted from the previous scheduled start. A cycle that overruns the
//! interval is followed straight away by the next one; cycles never overlap
//! and missed ticks are not replayed.
//!
//! The stop signal is only looked at between cycles. A stalled request
//! stalls the whole cycle.

use crate::registry::NodeRegistry;
use crate::render::{CycleReport, NodeStatus, Renderer};
use loopnode_client::{ApiClient, HttpTransport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Drives every node once per interval.
pub struct Scheduler<T, R> {
    registry: NodeRegistry,
    api: Arc<ApiClient<T>>,
    renderer: R,
    interval: Duration,
    rng: StdRng,
    cycle: u64,
}

impl<T: HttpTransport, R: Renderer> Scheduler<T, R> {
    /// Create a scheduler. A zero interval is raised to one millisecond.
    pub fn new(
        registry: NodeRegistry,
        api: Arc<ApiClient<T>>,
        renderer: R,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            api,
            renderer,
            interval: interval.max(Duration::from_millis(1)),
            rng: StdRng::from_entropy(),
            cycle: 0,
        }
    }

    /// Replace the quality sampler (deterministic tests).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Completed cycles so far.
    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Tick every node once, in registry order.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        debug!("Cycle {} starting ({} nodes)", self.cycle, self.registry.len());

        let mut statuses = Vec::with_capacity(self.registry.len());
        for node in self.registry.iter_mut() {
            let result = node.tick(&*self.api, &mut self.rng).await;
            statuses.push(NodeStatus::new(node, result));
        }

        let report = CycleReport {
            cycle: self.cycle,
            statuses,
        };
        debug!(
            "Cycle {} done: {} failed, {:+} earned",
            report.cycle,
            report.failures(),
            report.total_earned()
        );
        report
    }

    /// Run cycles until `stop` becomes `true`.
    ///
    /// Returns the number of cycles completed by this call. If the sender
    /// side of `stop` is dropped the loop can no longer be stopped and runs
    /// until the task is cancelled.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> u64 {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Running {} node(s) every {}s",
            self.registry.len(),
            self.interval.as_secs_f64()
        );

        let mut stoppable = true;
        let mut completed = 0;
        loop {
            if *stop.borrow_and_update() {
                break;
            }

            if stoppable {
                tokio::select! {
                    biased;
                    changed = stop.changed() => {
                        if changed.is_err() {
                            stoppable = false;
                        }
                        continue;
                    }
                    _ = ticker.tick() => {}
                }
            } else {
                ticker.tick().await;
            }

            let report = self.run_cycle().await;
            self.renderer.render(&report);
            completed += 1;
        }

        info!("Stopped after {} cycle(s)", completed);
        completed
    }
}
