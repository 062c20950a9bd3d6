//! Episode wrapper owning one world, its RNG and its lifecycle.

use crate::engine::{Observation, WorldState};
use crate::init::initialize;
use crate::policy::Policy;
use crate::survival::{self, StepResult};
use foodgrid_core::{Action, EnvConfig, EpisodeId, EpisodeStats, EpisodeStatus, Error, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Serializable episode state for checkpointing
#[derive(Debug, Serialize, Deserialize)]
struct EnvSnapshot {
    config: EnvConfig,
    world: WorldState,
    status: EpisodeStatus,
    stats: EpisodeStats,
}

/// The food survival environment
pub struct FoodEnv {
    id: EpisodeId,
    config: EnvConfig,
    rng: ChaCha8Rng,
    world: WorldState,
    status: EpisodeStatus,
    stats: EpisodeStats,
}

impl FoodEnv {
    /// Validate `config` and build the first episode
    pub fn new(config: EnvConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let world = initialize(&config, &mut rng)?;
        let stats = EpisodeStats::new(world.agent.energy);

        Ok(Self {
            id: EpisodeId::new(),
            config,
            rng,
            world,
            status: EpisodeStatus::Running,
            stats,
        })
    }

    pub fn id(&self) -> EpisodeId {
        self.id
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    pub fn observation(&self) -> Observation {
        self.world.observation()
    }

    /// Start a new episode, optionally re-seeding the RNG first
    pub fn reset(&mut self, seed: Option<u64>) -> Result<Observation> {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }

        self.world = initialize(&self.config, &mut self.rng)?;
        self.id = EpisodeId::new();
        self.status = EpisodeStatus::Running;
        self.stats = EpisodeStats::new(self.world.agent.energy);

        debug!(episode_id = %self.id, ?seed, "Episode reset");
        Ok(self.world.observation())
    }

    /// Apply one action. Fails once the episode has terminated.
    pub fn step(&mut self, action: Action) -> Result<StepResult> {
        if self.status.is_terminal() {
            return Err(Error::EpisodeFinished);
        }

        let result = survival::step(&mut self.world, &self.config, action);
        self.status = result.status;
        self.stats.status = result.status;
        self.stats.record_step(
            result.info.agent_energy,
            result.reward,
            result.info.consumed.is_some(),
        );

        if result.done {
            info!(
                event = "episode_end",
                episode_id = %self.id,
                status = ?self.status,
                steps = self.stats.steps,
                food_eaten = self.stats.food_eaten,
                final_energy = self.stats.final_energy,
                reward = self.stats.final_reward,
                "Episode finished"
            );
        }

        Ok(result)
    }

    /// Drive the current episode to termination with `policy`
    #[instrument(skip(self, policy), fields(episode_id = %self.id))]
    pub fn run_episode<P: Policy + ?Sized>(&mut self, policy: &mut P) -> Result<EpisodeStats> {
        let mut observation = self.world.observation();

        while !self.status.is_terminal() {
            let action = policy.act(&observation);
            observation = self.step(action)?.observation;
        }

        Ok(self.stats.clone())
    }

    /// Serialize the episode state. The RNG is not included.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let snapshot = EnvSnapshot {
            config: self.config.clone(),
            world: self.world.clone(),
            status: self.status,
            stats: self.stats.clone(),
        };
        Ok(bincode::serialize(&snapshot)?)
    }

    /// Replace the episode state with a snapshot taken by [`FoodEnv::snapshot`]
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        let snapshot: EnvSnapshot = bincode::deserialize(bytes)?;
        snapshot.config.validate()?;
        snapshot.world.check_matches(&snapshot.config)?;

        self.config = snapshot.config;
        self.world = snapshot.world;
        self.status = snapshot.status;
        self.stats = snapshot.stats;
        self.id = EpisodeId::new();

        debug!(episode_id = %self.id, step = self.world.step_count, "Episode restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ForagerPolicy, RandomPolicy};
    use crate::agent::Agent;
    use foodgrid_core::{Direction, Entity, Food, Position};
    use proptest::prelude::*;

    #[test]
    fn test_env_creation() {
        let env = FoodEnv::new(EnvConfig::default()).unwrap();
        assert_eq!(env.status(), EpisodeStatus::Running);
        assert_eq!(env.world().agent.energy, 8.0);
        assert_eq!(env.stats().steps, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = FoodEnv::new(EnvConfig::square(2));
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_starvation_without_food() {
        let mut env = FoodEnv::new(EnvConfig::default()).unwrap();
        env.world.grid = {
            let mut grid = crate::grid::Grid::new(8, 8);
            grid.wall_rect(0, 0, 8, 8);
            grid
        };

        let mut steps = 0;
        loop {
            let result = env.step(Action::Left).unwrap();
            steps += 1;
            if result.done {
                assert_eq!(result.status, EpisodeStatus::Starved);
                assert_eq!(result.info.agent_energy, 0.0);
                break;
            }
        }

        assert_eq!(steps, 8);
        assert_eq!(env.stats().status, EpisodeStatus::Starved);
    }

    #[test]
    fn test_step_after_termination_is_rejected() {
        let config = EnvConfig {
            life_expectancy: 2,
            ..EnvConfig::default()
        };
        let mut env = FoodEnv::new(config).unwrap();

        env.step(Action::Left).unwrap();
        let last = env.step(Action::Left).unwrap();
        assert!(last.done);
        let energy = env.world().agent.energy;

        assert!(matches!(env.step(Action::Left), Err(Error::EpisodeFinished)));
        assert_eq!(env.world().agent.energy, energy);
        assert_eq!(env.world().step_count, 2);
    }

    #[test]
    fn test_pickup_on_third_step() {
        let mut env = FoodEnv::new(EnvConfig::default()).unwrap();
        for pos in env.world.grid.food_positions() {
            env.world.grid.set(pos, None);
        }
        env.world
            .grid
            .set(Position::new(2, 1), Some(Entity::Food(Food::new(8.0))));

        env.step(Action::Left).unwrap();
        env.step(Action::Right).unwrap();
        let result = env.step(Action::Pickup).unwrap();

        assert_eq!(result.info.agent_energy, 13.0);
        assert_eq!(env.stats().food_eaten, 1);
        assert_eq!(env.stats().peak_energy, 13.0);
    }

    #[test]
    fn test_reset_is_reproducible() {
        let config = EnvConfig::square(16).with_random_start();
        let mut env = FoodEnv::new(config).unwrap();

        let first = env.reset(Some(99)).unwrap();
        env.step(Action::Forward).unwrap();
        let second = env.reset(Some(99)).unwrap();

        assert_eq!(first, second);
        assert_eq!(env.world().step_count, 0);
        assert_eq!(env.status(), EpisodeStatus::Running);
    }

    #[test]
    fn test_reset_after_termination() {
        let config = EnvConfig {
            life_expectancy: 1,
            ..EnvConfig::default()
        };
        let mut env = FoodEnv::new(config).unwrap();
        let old_id = env.id();

        assert!(env.step(Action::Done).unwrap().done);
        env.reset(None).unwrap();

        assert_ne!(env.id(), old_id);
        assert!(env.step(Action::Done).is_ok());
    }

    #[test]
    fn test_run_episode_terminates() {
        let mut env = FoodEnv::new(EnvConfig::square(6).with_seed(5)).unwrap();
        let mut policy = RandomPolicy::new(5);

        let stats = env.run_episode(&mut policy).unwrap();
        assert!(stats.status.is_terminal());
        assert!(stats.steps >= 1 && stats.steps <= 20);
        assert_eq!(stats.final_reward, stats.steps as f64 / 20.0);
    }

    #[test]
    fn test_forager_episodes_terminate() {
        let mut env = FoodEnv::new(EnvConfig::square(5).with_seed(1)).unwrap();
        let mut policy = ForagerPolicy::new(1);

        for seed in 0..20 {
            env.reset(Some(seed)).unwrap();
            let stats = env.run_episode(&mut policy).unwrap();
            // Energy alone lasts 5 steps on a 5x5 grid
            assert!(stats.status.is_terminal());
            assert!(stats.steps >= 5);
            assert_eq!(stats.food_eaten > 0, stats.steps > 5);
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut env = FoodEnv::new(EnvConfig::square(6).with_seed(3)).unwrap();
        env.step(Action::Forward).unwrap();
        let bytes = env.snapshot().unwrap();

        env.step(Action::Left).unwrap();
        env.step(Action::Left).unwrap();
        env.restore(&bytes).unwrap();

        assert_eq!(env.world().step_count, 1);
        assert_eq!(env.world().agent.energy, 5.0);
        assert_eq!(env.stats().steps, 1);
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let mut env = FoodEnv::new(EnvConfig::default()).unwrap();
        assert!(matches!(
            env.restore(&[1, 2, 3]),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_restore_rejects_mismatched_world() {
        let mut env = FoodEnv::new(EnvConfig::default()).unwrap();

        let mut grid = crate::grid::Grid::new(3, 3);
        grid.wall_rect(0, 0, 3, 3);
        let agent = Agent::new(Position::new(40, 40), Direction::East, 8.0);
        let snapshot = EnvSnapshot {
            config: EnvConfig::default(),
            world: WorldState::new(grid, agent, 20, String::new()),
            status: EpisodeStatus::Running,
            stats: EpisodeStats::new(8.0),
        };
        let bytes = bincode::serialize(&snapshot).unwrap();

        assert!(matches!(
            env.restore(&bytes),
            Err(Error::InvalidConfiguration(_))
        ));
        assert_eq!(env.world().grid.width, 8);
        assert!(env.step(Action::Forward).is_ok());
    }

    #[test]
    fn test_restore_starts_new_episode_id() {
        let mut env = FoodEnv::new(EnvConfig::square(6).with_seed(4)).unwrap();
        let bytes = env.snapshot().unwrap();
        let before = env.id();

        env.restore(&bytes).unwrap();
        assert_ne!(env.id(), before);
    }

    proptest! {
        #[test]
        fn prop_energy_and_reward_accounting(
            seed in any::<u64>(),
            size in 5i32..12,
            actions in proptest::collection::vec(0usize..7, 1..60),
        ) {
            let config = EnvConfig::square(size).with_random_start().with_seed(seed);
            let horizon = config.life_expectancy;
            let payoff = config.starting_energy();
            let mut env = FoodEnv::new(config).unwrap();

            for (i, index) in actions.into_iter().enumerate() {
                let before = env.world().agent.energy;
                let action = Action::from_index(index).unwrap();

                match env.step(action) {
                    Ok(result) => {
                        let step_count = (i + 1) as u64;
                        prop_assert_eq!(result.reward, step_count as f64 / horizon as f64);
                        prop_assert!(step_count <= horizon);

                        if let Some(eaten) = result.info.consumed {
                            prop_assert_eq!(eaten, payoff);
                        }
                        if !result.done {
                            let gained = result.info.consumed.unwrap_or(0.0);
                            prop_assert_eq!(result.info.agent_energy, before - 1.0 + gained);
                            prop_assert!(result.info.agent_energy > 0.0);
                        }
                        prop_assert!(env.world().agent.carrying.is_none());
                        prop_assert_eq!(result.info.agent_energy, env.world().agent.energy);
                    }
                    Err(e) => {
                        prop_assert!(matches!(e, Error::EpisodeFinished));
                        prop_assert!(env.status().is_terminal());
                        prop_assert_eq!(env.world().agent.energy, before);
                    }
                }
            }
        }
    }
}
