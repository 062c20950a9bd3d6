//! Action sources for driving episodes.

use crate::engine::Observation;
use foodgrid_core::{Action, Error, Result, OBJECT_EMPTY, OBJECT_FOOD};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Chooses the next action from an observation
pub trait Policy: Send {
    fn act(&mut self, observation: &Observation) -> Action;
}

/// Uniformly random actions
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &Observation) -> Action {
        *Action::all()
            .choose(&mut self.rng)
            .unwrap_or(&Action::Done)
    }
}

/// Picks up food in front, turns towards adjacent food, otherwise wanders
pub struct ForagerPolicy {
    rng: ChaCha8Rng,
    /// Probability of moving forward when nothing is nearby
    pub forward_bias: f64,
}

impl ForagerPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            forward_bias: 0.75,
        }
    }

    fn is_food(observation: &Observation, dx: i32, dy: i32) -> bool {
        let pos = observation.agent_position.add(dx, dy);
        observation.cell(pos).map_or(false, |cell| cell[0] == OBJECT_FOOD)
    }
}

impl Policy for ForagerPolicy {
    fn act(&mut self, observation: &Observation) -> Action {
        let facing = observation.direction;
        let (fx, fy) = facing.to_delta();
        if Self::is_food(observation, fx, fy) {
            return Action::Pickup;
        }

        let (lx, ly) = facing.turn_left().to_delta();
        if Self::is_food(observation, lx, ly) {
            return Action::Left;
        }

        let (rx, ry) = facing.turn_right().to_delta();
        // Food behind is reached by turning right twice
        if Self::is_food(observation, rx, ry) || Self::is_food(observation, -fx, -fy) {
            return Action::Right;
        }

        let ahead = observation.agent_position.add(fx, fy);
        let ahead_free = observation
            .cell(ahead)
            .map_or(false, |cell| cell[0] == OBJECT_EMPTY);
        if ahead_free && self.rng.gen_bool(self.forward_bias) {
            Action::Forward
        } else if self.rng.gen_bool(0.5) {
            Action::Left
        } else {
            Action::Right
        }
    }
}

/// Build a policy by name
pub fn by_name(name: &str, seed: u64) -> Result<Box<dyn Policy>> {
    match name {
        "random" => Ok(Box::new(RandomPolicy::new(seed))),
        "forager" => Ok(Box::new(ForagerPolicy::new(seed))),
        other => Err(Error::InvalidConfiguration(format!(
            "unknown policy '{}', expected 'random' or 'forager'",
            other
        ))),
    }
}
