//! Actor lifecycle.
//!
//! An actor starts [`LifecycleState::Running`], moves to
//! [`LifecycleState::Stopping`] when a stop command or termination signal
//! arrives, and ends [`LifecycleState::Stopped`] once the runner has torn
//! down its bus connection. Transitions only move forward.
//!
//! The state lives in a `watch` channel so any task (the signal listener,
//! the runner loop, a test) can request a stop, and the runner's idle wait
//! wakes up as soon as it happens.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Where an actor is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    /// Processing messages and ticking.
    Running,
    /// A stop was requested; the runner is finishing its iteration.
    Stopping,
    /// Teardown has completed.
    Stopped,
}

/// What caused the actor to leave [`LifecycleState::Running`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A `stop` payload arrived on the command topic.
    Command,
    /// The process received an interrupt or terminate signal.
    Signal,
    /// The inbound channel closed underneath the runner.
    InboundClosed,
    /// The loop body failed and the runner bailed out.
    Fault,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Command => "stop command",
            Self::Signal => "termination signal",
            Self::InboundClosed => "inbound channel closed",
            Self::Fault => "loop fault",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Status {
    state: LifecycleState,
    reason: Option<StopReason>,
}

/// Shared handle to an actor's lifecycle state.
///
/// Cloning is cheap; all clones observe and drive the same state.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    status: Arc<watch::Sender<Status>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Create a lifecycle in [`LifecycleState::Running`].
    #[must_use]
    pub fn new() -> Self {
        let (status, _) = watch::channel(Status {
            state: LifecycleState::Running,
            reason: None,
        });
        Self {
            status: Arc::new(status),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.status.borrow().state
    }

    /// Returns `true` while the actor should keep processing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// The reason recorded by the first successful [`Lifecycle::request_stop`].
    #[must_use]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.status.borrow().reason
    }

    /// Move from running to stopping.
    ///
    /// Returns `true` if this call performed the transition; later calls
    /// (from any task) are no-ops and keep the first reason.
    pub fn request_stop(&self, reason: StopReason) -> bool {
        let changed = self.status.send_if_modified(|status| {
            if status.state != LifecycleState::Running {
                return false;
            }
            status.state = LifecycleState::Stopping;
            status.reason = Some(reason);
            true
        });
        if changed {
            info!(%reason, "stop requested");
        }
        changed
    }

    /// Record that teardown has completed.
    ///
    /// Implies a stop request if none was made.
    pub fn mark_stopped(&self) {
        self.status.send_if_modified(|status| {
            if status.state == LifecycleState::Stopped {
                return false;
            }
            status.state = LifecycleState::Stopped;
            true
        });
    }

    /// Wait until the actor is no longer running.
    ///
    /// Returns immediately if a stop has already been requested.
    pub async fn stop_requested(&self) {
        let mut rx = self.status.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx
            .wait_for(|status| status.state != LifecycleState::Running)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_starts_running() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.is_running());
        assert_eq!(lifecycle.state(), LifecycleState::Running);
        assert_eq!(lifecycle.stop_reason(), None);
    }

    #[test]
    fn test_first_stop_wins() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.request_stop(StopReason::Signal));
        assert!(!lifecycle.request_stop(StopReason::Command));
        assert_eq!(lifecycle.state(), LifecycleState::Stopping);
        assert_eq!(lifecycle.stop_reason(), Some(StopReason::Signal));
    }

    #[test]
    fn test_transitions_are_monotonic() {
        let lifecycle = Lifecycle::new();
        lifecycle.request_stop(StopReason::Command);
        lifecycle.mark_stopped();
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert!(!lifecycle.request_stop(StopReason::Signal));
        assert_eq!(lifecycle.state(), LifecycleState::Stopped);
        assert!(!lifecycle.is_running());
    }

    #[test]
    fn test_clones_share_state() {
        let lifecycle = Lifecycle::new();
        let other = lifecycle.clone();
        other.request_stop(StopReason::Command);
        assert!(!lifecycle.is_running());
    }

    #[tokio::test]
    async fn test_stop_requested_wakes_waiter() {
        let lifecycle = Lifecycle::new();
        let waiter = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.stop_requested().await })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        let stopper = lifecycle.clone();
        std::thread::spawn(move || stopper.request_stop(StopReason::Signal))
            .join()
            .unwrap();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_stop_requested_returns_when_already_stopping() {
        let lifecycle = Lifecycle::new();
        lifecycle.request_stop(StopReason::Command);
        lifecycle.stop_requested().await;
    }
}
