//! Shutdown signal handling
//!
//! SIGTERM and SIGINT (Ctrl+C) both request a graceful shutdown.

use std::sync::Arc;
use tokio::sync::watch;

use crate::logger;

/// Signal handler state
///
/// Shutdown is a latched flag: subscribers created after the request still
/// observe it.
#[derive(Debug)]
pub struct SignalHandler {
    shutdown: watch::Sender<bool>,
}

impl SignalHandler {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self { shutdown }
    }

    /// Receiver that flips to `true` once shutdown is requested
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Ask the server loop and open connections to stop; repeats are ignored
    pub fn request_shutdown(&self) {
        self.shutdown
            .send_if_modified(|requested| !std::mem::replace(requested, true));
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once `shutdown` reports a request
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A closed channel means the handler is gone; treat it as a request
    let _ = shutdown.wait_for(|requested| *requested).await;
}

/// Spawn the task listening for SIGTERM and SIGINT
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_error(&format!("Failed to register signal handlers: {e}"));
                    return;
                }
            };

        tracing::debug!("[Signal] SIGTERM/SIGINT handlers registered, pid {}", std::process::id());

        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        tracing::info!("[Signal] {name} received, shutting down");
        handler.request_shutdown();
    });
}

/// Non-unix fallback, only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("[Signal] Ctrl+C received, shutting down");
                handler.request_shutdown();
            }
            Err(e) => logger::log_error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_request_reaches_early_and_late_subscribers() {
        let handler = SignalHandler::new();
        let mut early = handler.subscribe();
        assert!(!*early.borrow());

        handler.request_shutdown();
        handler.request_shutdown();

        let mut late = handler.subscribe();
        tokio::time::timeout(Duration::from_secs(1), async {
            wait_for_shutdown(&mut early).await;
            wait_for_shutdown(&mut late).await;
        })
        .await
        .unwrap();
    }
}
