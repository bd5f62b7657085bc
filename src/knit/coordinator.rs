//! Threaded knitting-execution coordinator.
//!
//! One knitting job at a time runs the enabled plugin's blocking `knit`
//! routine on a dedicated background thread, with all plugin output flowing
//! back through the ordered [`EventQueue`]. Lifecycle:
//!
//! ```text
//! Idle -> Knitting -> {Completed, Cancelled, Failed} -> Idle
//! ```
//!
//! Only a state-machine violation raised by the routine
//! ([`KnitlineError::Transition`]) is absorbed into the `Failed` terminal
//! state; every other worker failure, including a panic, propagates to the
//! caller.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::error::{KnitlineError, KnitlineResult};
use crate::knit::event::{EventQueue, HostLink};
use crate::plugin::api::KnitPlugin;

/// Lifecycle state of the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum JobState {
    /// No job; `start` is accepted.
    Idle,
    /// The background worker is running (or has finished and awaits
    /// collection via `try_finish`/`wait`).
    Knitting,
}

/// Terminal outcome of one knitting job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum JobOutcome {
    /// The routine returned normally with no cancellation requested.
    Completed,
    /// The routine returned after a cancellation request.
    Cancelled,
    /// The routine raised a state-machine violation (absorbed and logged).
    Failed,
}

struct KnitJob {
    plugin: Arc<dyn KnitPlugin>,
    handle: JoinHandle<KnitlineResult<()>>,
    cancel_requested: bool,
}

/// Runs knitting jobs and relays their events to the foreground.
///
/// Single-writer: the coordinator lives on the foreground thread; only the
/// job's worker thread runs in the background, and it communicates solely
/// through the event queue.
pub struct Coordinator {
    job: Option<KnitJob>,
    events: EventQueue,
    link: HostLink,
}

impl Coordinator {
    /// Coordinator with a fresh event queue, in `Idle`.
    pub fn new() -> Self {
        let (link, events) = EventQueue::channel();
        Self {
            job: None,
            events,
            link,
        }
    }

    /// Current lifecycle state. Terminal states are reported once, by
    /// `try_finish`/`wait`, after which the coordinator is `Idle` again.
    pub fn state(&self) -> JobState {
        if self.job.is_some() {
            JobState::Knitting
        } else {
            JobState::Idle
        }
    }

    /// Ordered queue of events emitted by the running job.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Launch `plugin`'s knitting routine on a background worker.
    ///
    /// Valid only from `Idle`; calling while a job exists fails with
    /// [`KnitlineError::Transition`] and leaves the running job untouched.
    pub fn start(&mut self, plugin: Arc<dyn KnitPlugin>) -> KnitlineResult<()> {
        if self.job.is_some() {
            return Err(KnitlineError::transition(
                "start requested while a knitting job is active",
            ));
        }

        let worker_plugin = plugin.clone();
        let link = self.link.clone();
        let handle = std::thread::Builder::new()
            .name("knit-worker".into())
            .spawn(move || worker_plugin.knit(&link))
            .map_err(|e| KnitlineError::plugin(format!("failed to spawn knit worker: {e}")))?;

        tracing::info!(plugin = plugin.name(), "knitting job started");
        self.job = Some(KnitJob {
            plugin,
            handle,
            cancel_requested: false,
        });
        Ok(())
    }

    /// Forward a cooperative cancellation request to the active plugin.
    ///
    /// Valid only from `Knitting`. Non-preemptive: the worker may keep
    /// emitting events until it observes the request; the job stays
    /// `Knitting` until the routine returns, after which `try_finish`/`wait`
    /// reports `Cancelled`.
    pub fn cancel(&mut self) -> KnitlineResult<()> {
        let job = self.job.as_mut().ok_or_else(|| {
            KnitlineError::transition("cancel requested with no active knitting job")
        })?;
        job.cancel_requested = true;
        job.plugin.cancel();
        tracing::info!(plugin = job.plugin.name(), "cancellation requested");
        Ok(())
    }

    /// Collect the job's terminal state if the worker has finished.
    ///
    /// Returns `None` while the worker is still running. On a terminal
    /// transition the coordinator resets to `Idle` and discards the job. A
    /// `Transition` error from the routine is logged and mapped to
    /// [`JobOutcome::Failed`]; any other error (or a worker panic)
    /// propagates.
    pub fn try_finish(&mut self) -> KnitlineResult<Option<JobOutcome>> {
        match &self.job {
            Some(job) if job.handle.is_finished() => {}
            Some(_) => return Ok(None),
            None => return Ok(None),
        }
        self.collect().map(Some)
    }

    /// Block until the worker finishes and report the terminal state.
    ///
    /// Valid only from `Knitting`. Same terminal mapping as `try_finish`.
    pub fn wait(&mut self) -> KnitlineResult<JobOutcome> {
        if self.job.is_none() {
            return Err(KnitlineError::transition(
                "wait requested with no active knitting job",
            ));
        }
        self.collect()
    }

    /// Block until the worker finishes, answering every event with
    /// `on_event` while waiting. Prompts not consumed by `on_event` would
    /// deadlock the worker, so the handler must respond to them.
    pub fn wait_with<F>(&mut self, mut on_event: F) -> KnitlineResult<JobOutcome>
    where
        F: FnMut(crate::knit::event::KnitEvent),
    {
        if self.job.is_none() {
            return Err(KnitlineError::transition(
                "wait requested with no active knitting job",
            ));
        }
        loop {
            while let Some(event) = self.events.next_timeout(Duration::from_millis(10)) {
                on_event(event);
            }
            if let Some(outcome) = self.try_finish()? {
                // Deliver events emitted between the last drain and exit.
                while let Some(event) = self.events.try_next() {
                    on_event(event);
                }
                return Ok(outcome);
            }
        }
    }

    fn collect(&mut self) -> KnitlineResult<JobOutcome> {
        let job = self
            .job
            .take()
            .ok_or_else(|| KnitlineError::transition("no knitting job to collect"))?;

        let result = job
            .handle
            .join()
            .map_err(|_| KnitlineError::plugin("knit worker panicked"))?;

        match result {
            Ok(()) if job.cancel_requested => {
                tracing::info!(plugin = job.plugin.name(), "knitting cancelled");
                Ok(JobOutcome::Cancelled)
            }
            Ok(()) => {
                tracing::info!(plugin = job.plugin.name(), "knitting completed");
                Ok(JobOutcome::Completed)
            }
            Err(KnitlineError::Transition(msg)) => {
                tracing::error!(plugin = job.plugin.name(), error = %msg, "knitting failed");
                Ok(JobOutcome::Failed)
            }
            Err(other) => Err(other),
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/knit/coordinator.rs"]
mod tests;
