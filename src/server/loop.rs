//! Server accept loop

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::{accept_connection, ConnectionCounter};
use super::signal::{wait_for_shutdown, SignalHandler};
use crate::config::AppState;
use crate::logger;

/// Accept connections until shutdown is requested, then drain.
///
/// Open connections are asked to close after their current response and
/// get `performance.shutdown_grace_period` seconds to do so before the
/// loop returns.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    counter: Arc<ConnectionCounter>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut shutdown = signals.subscribe();
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &counter, &signals);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = wait_for_shutdown(&mut shutdown) => break,
        }
    }

    drop(listener);
    logger::log_shutdown_requested(counter.active());

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_period);
    // An elapsed grace period is reported through the remaining count
    let _ = tokio::time::timeout(grace, counter.wait_idle()).await;
    logger::log_shutdown_complete(counter.active());

    Ok(())
}
