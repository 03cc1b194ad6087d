//! Connection handling
//!
//! Accepts a TCP connection against the connection limit and serves it
//! over HTTP/1.1 in its own task.

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{watch, Notify};
use tokio::time::{sleep_until, Instant};

use super::signal::{self, SignalHandler};
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Number of connections currently being served
#[derive(Debug, Default)]
pub struct ConnectionCounter {
    active: AtomicUsize,
    idle: Notify,
}

impl ConnectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Reserve a slot, `false` when `max` connections are already open
    pub fn try_acquire(&self, max: Option<u64>) -> bool {
        // Increment first, then check, so concurrent accepts cannot overshoot
        let prev = self.active.fetch_add(1, Ordering::SeqCst);
        if let Some(max) = max {
            if prev >= usize::try_from(max).unwrap_or(usize::MAX) {
                self.active.fetch_sub(1, Ordering::SeqCst);
                return false;
            }
        }
        true
    }

    pub fn release(&self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    /// Resolves once no connection is active
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a release in between is not lost
            notified.as_mut().enable();
            if self.active() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Request activity on one connection, for the keep-alive idle limit
#[derive(Debug)]
struct Activity {
    in_flight: AtomicUsize,
    last: Mutex<Instant>,
}

impl Activity {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            last: Mutex::new(Instant::now()),
        }
    }

    fn last(&self) -> Instant {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(self: &Arc<Self>) -> ActivityGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        ActivityGuard(Arc::clone(self))
    }

    /// Instant after which the connection counts as idle, if nothing changes
    fn idle_deadline(&self, limit: Duration) -> Instant {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            Instant::now() + limit
        } else {
            self.last() + limit
        }
    }

    fn is_idle_for(&self, limit: Duration) -> bool {
        self.in_flight.load(Ordering::SeqCst) == 0 && self.last().elapsed() >= limit
    }
}

struct ActivityGuard(Arc<Activity>);

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        *self.0.last.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, checking the connection limit.
///
/// Connections over `performance.max_connections` are dropped right away.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    counter: &Arc<ConnectionCounter>,
    signals: &SignalHandler,
) {
    let max_conn = state.config.performance.max_connections;
    if !counter.try_acquire(max_conn) {
        logger::log_warning(&format!(
            "Max connections reached: {}/{}. Connection from {peer_addr} rejected.",
            counter.active(),
            max_conn.unwrap_or_default()
        ));
        drop(stream);
        return;
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(counter),
        signals.subscribe(),
    );
}

/// Serve a single connection in a spawned task.
///
/// The connection is closed gracefully when shutdown is requested or when
/// it has been idle for `performance.keep_alive_timeout` seconds. Request
/// headers must arrive within `read_timeout`; once closing, the peer has
/// `write_timeout` to take the last response before the socket is dropped.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    counter: Arc<ConnectionCounter>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let keep_alive = performance.keep_alive_timeout > 0;
        let idle_limit = Duration::from_secs(performance.keep_alive_timeout);
        let write_timeout = Duration::from_secs(performance.write_timeout);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(keep_alive)
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(performance.read_timeout));

        let activity = Arc::new(Activity::new());
        let service_activity = Arc::clone(&activity);
        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let guard = service_activity.begin();
                let state = Arc::clone(&service_state);
                async move {
                    let response = handler::handle_request(req, state, Some(peer_addr)).await;
                    drop(guard);
                    response
                }
            }),
        );
        tokio::pin!(conn);

        let mut closing_since: Option<Instant> = None;
        loop {
            let idle_deadline = activity.idle_deadline(idle_limit);
            let closing_deadline = closing_since.map(|since| since + write_timeout);

            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(err) = result {
                        logger::log_connection_error(&err);
                    }
                    break;
                }

                () = signal::wait_for_shutdown(&mut shutdown), if closing_since.is_none() => {
                    conn.as_mut().graceful_shutdown();
                    closing_since = Some(Instant::now());
                }

                () = sleep_until(idle_deadline), if keep_alive && closing_since.is_none() => {
                    if activity.is_idle_for(idle_limit) {
                        conn.as_mut().graceful_shutdown();
                        closing_since = Some(Instant::now());
                    }
                }

                () = sleep_until(closing_deadline.unwrap_or(idle_deadline)), if closing_deadline.is_some() => {
                    logger::log_warning(&format!(
                        "Connection from {peer_addr} did not close within {} seconds; dropping it",
                        write_timeout.as_secs()
                    ));
                    break;
                }
            }
        }

        counter.release();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_limit() {
        let counter = ConnectionCounter::new();
        assert!(counter.try_acquire(Some(2)));
        assert!(counter.try_acquire(Some(2)));
        assert!(!counter.try_acquire(Some(2)));
        assert_eq!(counter.active(), 2);

        counter.release();
        assert!(counter.try_acquire(Some(2)));
        assert!(counter.try_acquire(None));
        assert_eq!(counter.active(), 3);
    }

    #[tokio::test]
    async fn test_wait_idle() {
        let counter = Arc::new(ConnectionCounter::new());
        counter.wait_idle().await;

        assert!(counter.try_acquire(None));
        let waiter = {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move { counter.wait_idle().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        counter.release();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
