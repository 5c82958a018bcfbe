//! AppBundle Controller
//!
//! Converges the cluster onto the objects a packaged chart bundle renders to.
//!
//! This controller reconciles `AppBundle` CRDs: it fetches the referenced
//! chart archive, expands it with an external templating command, creates
//! each rendered manifest in the cluster (tolerating objects that already
//! exist) and records success in `status.deployed`.

mod backoff;
mod controller;
mod error;
mod reconciler;
mod store;
mod watcher;
#[cfg(test)]
mod test_utils;

use crate::error::ControllerError;
use controller::Controller;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting AppBundle Controller");

    // Load configuration from environment variables
    let render_command = env::var("HELM_BIN").unwrap_or_else(|_| "helm".to_string());
    let namespace = env::var("WATCH_NAMESPACE").ok();

    info!("Configuration:");
    info!("  Render command: {}", render_command);
    info!("  Namespace: {}", namespace.as_deref().unwrap_or("default"));

    // Initialize and run controller
    let controller = Controller::new(render_command, namespace).await?;
    controller.run().await?;

    Ok(())
}
