//! Process signal handling.
//!
//! An interrupt (Ctrl-C) or, on unix, a terminate request has the same
//! effect as a `stop` command: the lifecycle moves to stopping and the
//! runner tears down gracefully.

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::lifecycle::{Lifecycle, StopReason};

/// Spawn a task that requests a stop when the process is signalled.
///
/// If the handlers cannot be installed the failure is logged and the task
/// exits; the actor keeps running and can still be stopped by command.
pub fn spawn_signal_listener(lifecycle: Lifecycle) -> JoinHandle<()> {
    tokio::spawn(async move {
        match termination().await {
            Ok(()) => {
                info!("shutdown signal received");
                lifecycle.request_stop(StopReason::Signal);
            }
            Err(e) => error!(error = %e, "failed to install signal handlers"),
        }
    })
}

#[cfg(unix)]
async fn termination() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Command;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_sigterm_requests_stop() {
        let lifecycle = Lifecycle::new();
        let listener = spawn_signal_listener(lifecycle.clone());

        // Let the listener install its handlers before signalling.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        let status = Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), lifecycle.stop_requested())
            .await
            .unwrap();
        assert_eq!(lifecycle.stop_reason(), Some(StopReason::Signal));
        listener.await.unwrap();
    }
}
