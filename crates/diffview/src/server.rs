use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::sync::Notify;
use tracing::{info, warn};

use diffview_core::ChangeStore;

use crate::api;

/// Serve the published changes until Ctrl+C or `POST /api/kill`.
pub async fn serve(store: Arc<ChangeStore>, addr: &str, open_browser: bool) -> Result<()> {
    let shutdown = Arc::new(Notify::new());
    let router = api::create_router(store, Arc::clone(&shutdown));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read server address")?;
    let url = format!("http://{}", local_addr);

    info!(%url, "Server listening");

    eprintln!();
    eprintln!("  {} {}", "->".bright_green(), format!("Open {}", url).bold());
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    if open_browser {
        if let Err(e) = open::that(&url) {
            warn!(error = %e, %url, "Failed to open browser; open the URL manually");
        }
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")
}

async fn shutdown_signal(kill: Arc<Notify>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                // Without a signal handler only the kill endpoint can stop us
                kill.notified().await;
            }
        }
        _ = kill.notified() => {}
    }
    eprintln!("\nShutting down...");
}
