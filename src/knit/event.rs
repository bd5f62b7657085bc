//! Ordered, thread-safe event surface between the background knitting worker
//! and the foreground host.
//!
//! The worker holds a [`HostLink`] and emits events; the foreground drains
//! the matching [`EventQueue`] on its own schedule. Delivery order matches
//! emission order. The blocking prompt is the single rendezvous point: the
//! worker blocks until the foreground replies.

use std::sync::mpsc;
use std::time::Duration;

use crate::foundation::error::{KnitlineError, KnitlineResult};

/// Severity/intent of a blocking prompt, mirroring the host's message-box
/// kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PromptKind {
    /// Informational acknowledgment.
    Info,
    /// Warning requiring acknowledgment.
    Warning,
    /// Error requiring acknowledgment.
    Error,
    /// Yes/no question.
    Question,
}

/// A blocking prompt in flight: the worker waits on the paired reply channel.
#[derive(Debug)]
pub struct PromptRequest {
    /// Prompt text shown to the operator.
    pub message: String,
    /// Prompt severity/intent.
    pub kind: PromptKind,
    reply: mpsc::SyncSender<bool>,
}

impl PromptRequest {
    /// Answer the prompt, unblocking the worker.
    pub fn respond(self, answer: bool) -> KnitlineResult<()> {
        self.reply
            .send(answer)
            .map_err(|_| KnitlineError::plugin("prompt requester is gone"))
    }
}

/// One event emitted by the knitting routine.
#[derive(Debug)]
pub enum KnitEvent {
    /// Progress update: completed `row` out of `total` (0 = unknown).
    Progress {
        /// Completed row.
        row: u32,
        /// Total rows, `0` when unknown.
        total: u32,
    },
    /// Free-text status notification.
    Notification(String),
    /// The plugin changed the active needle span.
    NeedleRange {
        /// First needle.
        start: u16,
        /// Last needle.
        stop: u16,
    },
    /// The plugin changed the alignment mode (wire spelling).
    Alignment(String),
    /// Blocking prompt requiring a foreground reply.
    Prompt(PromptRequest),
}

/// Worker-side handle for emitting events to the foreground.
///
/// Cloneable and safe to use from the background worker; all sends preserve
/// emission order.
#[derive(Clone, Debug)]
pub struct HostLink {
    tx: mpsc::Sender<KnitEvent>,
}

impl HostLink {
    /// Report knitting progress.
    pub fn progress(&self, row: u32, total: u32) -> KnitlineResult<()> {
        self.send(KnitEvent::Progress { row, total })
    }

    /// Post a status notification.
    pub fn notify(&self, text: impl Into<String>) -> KnitlineResult<()> {
        self.send(KnitEvent::Notification(text.into()))
    }

    /// Report a changed needle span.
    pub fn needle_range(&self, start: u16, stop: u16) -> KnitlineResult<()> {
        self.send(KnitEvent::NeedleRange { start, stop })
    }

    /// Report a changed alignment mode.
    pub fn alignment(&self, mode: impl Into<String>) -> KnitlineResult<()> {
        self.send(KnitEvent::Alignment(mode.into()))
    }

    /// Raise a blocking prompt and wait for the foreground's answer.
    ///
    /// This blocks the calling worker until the foreground responds or the
    /// queue is dropped.
    pub fn blocking_prompt(
        &self,
        message: impl Into<String>,
        kind: PromptKind,
    ) -> KnitlineResult<bool> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.send(KnitEvent::Prompt(PromptRequest {
            message: message.into(),
            kind,
            reply: reply_tx,
        }))?;
        reply_rx
            .recv()
            .map_err(|_| KnitlineError::plugin("host dropped the prompt without replying"))
    }

    fn send(&self, event: KnitEvent) -> KnitlineResult<()> {
        self.tx
            .send(event)
            .map_err(|_| KnitlineError::plugin("host event queue disconnected"))
    }
}

/// Foreground-side ordered event queue.
#[derive(Debug)]
pub struct EventQueue {
    rx: mpsc::Receiver<KnitEvent>,
}

impl EventQueue {
    /// Create a connected link/queue pair.
    pub fn channel() -> (HostLink, EventQueue) {
        let (tx, rx) = mpsc::channel();
        (HostLink { tx }, EventQueue { rx })
    }

    /// Next pending event, if any. Never blocks.
    pub fn try_next(&self) -> Option<KnitEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_timeout(&self, timeout: Duration) -> Option<KnitEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain all pending events in emission order. Never blocks.
    pub fn drain(&self) -> Vec<KnitEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
#[path = "../../tests/unit/knit/event.rs"]
mod tests;
