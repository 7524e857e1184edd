//! Tick scheduling
//!
//! Anything that can advance by one tick implements [`Scheduler`]. Tests
//! and headless runs drive it synchronously with [`run_to_completion`];
//! interactive front ends use [`run_paced`], which fires ticks from a
//! wall-clock timer. Either way a tick always completes before the next one
//! starts, and a stop request is only looked at between ticks.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::simulation::controller::Simulation;
use crate::simulation::tick::{RunStatus, TickReport};

pub trait Scheduler {
    /// Advance by one tick
    fn tick(&mut self) -> TickReport;

    fn is_running(&self) -> bool;

    /// Halt without a verdict
    fn stop(&mut self);
}

impl Scheduler for Simulation {
    fn tick(&mut self) -> TickReport {
        Simulation::tick(self)
    }

    fn is_running(&self) -> bool {
        Simulation::is_running(self)
    }

    fn stop(&mut self) {
        Simulation::stop(self)
    }
}

/// Tick until the run ends or `max_ticks` have elapsed
///
/// Returns the status after the last tick. A run still going at the limit
/// is stopped.
pub fn run_to_completion<S: Scheduler>(scheduler: &mut S, max_ticks: u64) -> RunStatus {
    let mut status = RunStatus::Idle;
    for _ in 0..max_ticks {
        if !scheduler.is_running() {
            break;
        }
        status = scheduler.tick().status;
    }
    if scheduler.is_running() {
        scheduler.stop();
        status = RunStatus::Stopped;
    }
    status
}

/// Tick on a fixed wall-clock period until the run ends or a stop arrives
///
/// `on_tick` sees every report, e.g. to redraw. Setting the watch value to
/// `true` stops the run before the next tick.
pub async fn run_paced<S, F>(
    scheduler: &mut S,
    period: Duration,
    mut stop: watch::Receiver<bool>,
    mut on_tick: F,
) -> RunStatus
where
    S: Scheduler,
    F: FnMut(&TickReport),
{
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut status = RunStatus::Idle;
    // Once every sender is gone no stop can arrive
    let mut stop_open = true;

    while scheduler.is_running() {
        tokio::select! {
            _ = timer.tick() => {
                if *stop.borrow() {
                    break;
                }
                let report = scheduler.tick();
                status = report.status;
                on_tick(&report);
            }
            changed = stop.changed(), if stop_open => {
                match changed {
                    Ok(()) if *stop.borrow() => break,
                    Ok(()) => {}
                    Err(_) => stop_open = false,
                }
            }
        }
    }

    if scheduler.is_running() {
        tracing::info!("Paced run interrupted");
        scheduler.stop();
        status = RunStatus::Stopped;
    }
    status
}
