//! Signal handling for interrupts

use std::{io, sync::Arc};
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::info;

use crate::state::ControlState;

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() -> io::Result<()> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;

    match signals.next().await {
        Some(signal) => info!("Received signal: {}", signal),
        None => std::future::pending().await,
    }
    Ok(())
}

/// Raise the interrupt flags once a shutdown signal arrives
pub async fn interrupt_on_signal(control: Arc<ControlState>) {
    match shutdown_signal().await {
        Ok(()) => control.interrupt(),
        Err(e) => control.report(format!("Failed to create signal handler: {}", e)),
    }
}
