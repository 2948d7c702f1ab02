//! Interactive interrupt handling.

use tracing::warn;

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; interrupts will not be handled");
        std::future::pending::<()>().await;
    }
}
