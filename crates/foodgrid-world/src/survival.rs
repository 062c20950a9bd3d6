//! Survival rules applied on top of the base transition.
//!
//! Per step, in order: base transition, food consumption, horizon check,
//! starvation check, metabolic decay, reward. Starvation is evaluated last
//! and wins over survival when both apply on the same step.

use crate::engine::{Observation, WorldState};
use foodgrid_core::{Action, EnvConfig, EpisodeStatus};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Metadata attached to every step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub agent_energy: f64,
    /// Payoff of the food consumed this step, if any
    pub consumed: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub status: EpisodeStatus,
    pub info: StepInfo,
}

/// Progressive reward: fraction of the horizon survived, at most 1.0
pub fn progressive_reward(step_count: u64, life_expectancy: u64) -> f64 {
    (step_count as f64 / life_expectancy as f64).min(1.0)
}

/// Advance `world` by one action under the survival rules
pub fn step(world: &mut WorldState, config: &EnvConfig, action: Action) -> StepResult {
    let base = world.base_step(action);
    let mut done = base.done;

    let consumed = world.agent.eat_carried().map(|food| food.energy());

    let reached_horizon = world.step_count >= config.life_expectancy;
    if reached_horizon && world.agent.is_alive() {
        done = true;
    }

    let starved = if !world.agent.is_alive() {
        true
    } else {
        world.agent.decay();
        !world.agent.is_alive()
    };

    let status = if starved {
        done = true;
        EpisodeStatus::Starved
    } else if done {
        EpisodeStatus::SurvivedToHorizon
    } else {
        EpisodeStatus::Running
    };

    let reward = progressive_reward(world.step_count, config.life_expectancy);
    let info = StepInfo {
        agent_energy: world.agent.energy,
        consumed,
    };

    trace!(
        step = world.step_count,
        ?action,
        energy = info.agent_energy,
        ?consumed,
        reward,
        ?status,
        "Step applied"
    );

    StepResult {
        observation: base.observation,
        reward,
        done,
        status,
        info,
    }
}
