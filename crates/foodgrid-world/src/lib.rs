//! Food survival grid world.
//!
//! An agent on a walled grid burns one unit of energy per step and must pick
//! up food to keep going until the life-expectancy horizon.

pub mod agent;
pub mod engine;
pub mod env;
pub mod grid;
pub mod init;
pub mod policy;
pub mod registry;
pub mod survival;

pub use agent::Agent;
pub use engine::{Observation, WorldState};
pub use env::FoodEnv;
pub use grid::Grid;
pub use policy::{ForagerPolicy, Policy, RandomPolicy};
pub use survival::{StepInfo, StepResult};
