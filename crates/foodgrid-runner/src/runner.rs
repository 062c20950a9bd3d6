//! Batch execution of episodes across concurrent workers.

use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use foodgrid_core::{RunnerConfig, VariantStats};
use foodgrid_world::{policy, registry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of a batch run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub episodes_completed: usize,
    pub interrupted: bool,
    pub variants: BTreeMap<String, VariantStats>,
}

pub struct EpisodeRunner {
    config: RunnerConfig,
    stats: Arc<DashMap<String, VariantStats>>,
    shutdown: Arc<AtomicBool>,
}

impl EpisodeRunner {
    pub fn new(config: RunnerConfig) -> Result<Self> {
        ensure!(config.workers > 0, "at least one worker is required");
        ensure!(!config.env_ids.is_empty(), "no environment variants configured");

        // Fail fast on typos before any worker starts
        for id in &config.env_ids {
            registry::lookup(id)?;
        }
        policy::by_name(&config.policy, config.seed)?;

        Ok(Self {
            config,
            stats: Arc::new(DashMap::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag checked by workers between episodes
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Run every configured episode and aggregate the results
    #[instrument(skip(self), fields(workers = self.config.workers, episodes = self.config.episodes))]
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        let handles: Vec<_> = (0..self.config.workers)
            .map(|worker_id| {
                let config = self.config.clone();
                let stats = self.stats.clone();
                let shutdown = self.shutdown.clone();
                tokio::task::spawn_blocking(move || run_worker(&config, worker_id, &stats, &shutdown))
            })
            .collect();

        let mut episodes_completed = 0;
        for joined in futures::future::join_all(handles).await {
            episodes_completed += joined??;
        }

        let interrupted = self.shutdown.load(Ordering::Relaxed);
        info!(
            event = "batch_complete",
            episodes_completed,
            interrupted,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "Batch finished"
        );

        let variants = self
            .stats
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            episodes_completed,
            interrupted,
            variants,
        })
    }
}

/// Worker `worker_id` takes every `workers`-th episode of each variant
fn run_worker(
    config: &RunnerConfig,
    worker_id: usize,
    stats: &DashMap<String, VariantStats>,
    shutdown: &AtomicBool,
) -> Result<usize> {
    debug!(worker_id, "Worker started");
    let mut completed = 0;

    for env_id in &config.env_ids {
        let mut env = registry::make(env_id, config.seed)?;

        for episode in (worker_id..config.episodes).step_by(config.workers) {
            if shutdown.load(Ordering::Relaxed) {
                warn!(worker_id, completed, "Worker stopping early");
                return Ok(completed);
            }

            let seed = config.seed.wrapping_add(episode as u64);
            env.reset(Some(seed))?;
            let mut policy = policy::by_name(&config.policy, seed)?;
            let episode_stats = env.run_episode(policy.as_mut())?;

            stats
                .entry(env_id.clone())
                .or_default()
                .update(&episode_stats);
            completed += 1;
        }
    }

    debug!(worker_id, completed, "Worker finished");
    Ok(completed)
}
