//! Taskbox application entry point
//!
//! Reads settings, builds the application state once, loads remote feature
//! flags and reports what it found.

mod state;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::state::AppState;
use taskbox_core::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskbox_app=debug,taskbox_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().context("Invalid settings")?;
    tracing::info!(
        "Using {:?} storage, data directory: {:?}",
        settings.storage,
        settings.data_dir
    );

    let app_state = AppState::new(settings)
        .await
        .context("Failed to initialize application state")?;

    // Fetch failures are absorbed, the defaults stay in effect
    let outcome = app_state
        .flags()
        .spawn_bootstrap()
        .await
        .context("Feature flag bootstrap panicked")?;
    tracing::info!("Feature flags ready: {:?}", outcome);

    let summary = app_state.summary().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
