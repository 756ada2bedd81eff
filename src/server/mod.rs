// Server module entry
// Accept loop, connection serving and graceful shutdown

mod connection;
mod listener;
mod signal;

pub use listener::create_listener;
pub use signal::start_signal_handler;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Polling interval while waiting for connections to drain
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `state.shutdown` fires, then wait up to
/// `server.shutdown_grace` seconds for in-flight connections.
///
/// Must run inside a `LocalSet`; connections are served with `spawn_local`.
pub async fn run(listener: TcpListener, state: Arc<AppState>) {
    let active = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state, &active);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = state.shutdown.notified() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    let grace = Duration::from_secs(state.config.server.shutdown_grace);
    logger::log_shutdown_started(active.load(Ordering::SeqCst), grace.as_secs());

    let deadline = tokio::time::Instant::now() + grace;
    while active.load(Ordering::SeqCst) > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(DRAIN_POLL).await;
    }

    logger::log_shutdown_complete(active.load(Ordering::SeqCst));
}
