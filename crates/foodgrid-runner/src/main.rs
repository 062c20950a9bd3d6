//! Batch runner for the food survival environment.
//!
//! Usage: `foodgrid-runner [config.json]`. Without an argument the default
//! runner configuration is used.

mod runner;
mod telemetry;

use anyhow::{Context, Result};
use foodgrid_core::RunnerConfig;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => RunnerConfig::load(&path)
            .with_context(|| format!("failed to load runner config from {}", path))?,
        None => RunnerConfig::default(),
    };

    telemetry::init_telemetry()?;

    info!(
        env_ids = ?config.env_ids,
        episodes = config.episodes,
        workers = config.workers,
        policy = %config.policy,
        "Starting Food-Grid runner"
    );

    let runner = Arc::new(runner::EpisodeRunner::new(config)?);
    let shutdown = runner.shutdown_handle();

    let mut batch = tokio::spawn({
        let runner = runner.clone();
        async move { runner.run().await }
    });

    let report = tokio::select! {
        joined = &mut batch => joined?,
        _ = shutdown_signal() => {
            info!("Waiting for workers to finish their current episode");
            shutdown.store(true, Ordering::Relaxed);
            batch.await?
        }
    };

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("Batch failed: {:#}", e);
            return Err(e);
        }
    };

    for (env_id, stats) in &report.variants {
        info!(
            env_id = %env_id,
            episodes = stats.episodes,
            survival_rate = format!("{:.2}%", stats.survival_rate() * 100.0),
            avg_steps = stats.avg_steps,
            avg_reward = stats.avg_reward,
            avg_food_eaten = stats.avg_food_eaten,
            "Variant summary"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
