//! Agent state.

use foodgrid_core::{Direction, Entity, Food, Position};
use serde::{Deserialize, Serialize};

/// Energy lost per step
pub const METABOLIC_COST: f64 = 1.0;

/// The agent in the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub position: Position,
    pub direction: Direction,
    pub energy: f64,
    /// At most one item, owned by the agent
    pub carrying: Option<Entity>,
}

impl Agent {
    pub fn new(position: Position, direction: Direction, energy: f64) -> Self {
        Self {
            position,
            direction,
            energy,
            carrying: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }

    /// Cell the agent is facing
    pub fn front_pos(&self) -> Position {
        self.position.step(self.direction)
    }

    pub fn add_energy(&mut self, amount: f64) {
        self.energy += amount;
    }

    /// Apply one step of metabolic decay
    pub fn decay(&mut self) {
        self.energy -= METABOLIC_COST;
    }

    /// Consume carried food, if any. Returns the eaten item.
    pub fn eat_carried(&mut self) -> Option<Food> {
        let food = *self.carrying.as_ref()?.as_food()?;
        self.carrying = None;
        self.add_energy(food.energy());
        Some(food)
    }
}
