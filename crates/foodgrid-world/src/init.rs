//! Initial world construction.

use crate::agent::Agent;
use crate::engine::{place_agent, WorldState};
use crate::grid::Grid;
use foodgrid_core::{AgentStart, EnvConfig, Entity, Food, Result};
use rand::Rng;
use tracing::debug;

/// Build the starting world: walls, agent, energy and food.
///
/// The configuration is assumed to be validated. Placement errors are
/// returned as-is when the grid cannot fit the agent and all food.
pub fn initialize<R: Rng + ?Sized>(config: &EnvConfig, rng: &mut R) -> Result<WorldState> {
    let (width, height) = (config.width, config.height);

    let mut grid = Grid::new(width, height);
    grid.wall_rect(0, 0, width, height);

    let (position, direction) = match config.agent_start {
        AgentStart::Fixed {
            position,
            direction,
        } => (position, direction),
        AgentStart::Random => place_agent(&grid, rng)?,
    };

    let starting_energy = config.starting_energy();
    let agent = Agent::new(position, direction, starting_energy);
    let mut world = WorldState::new(grid, agent, config.life_expectancy, config.mission());

    let food_count = config.food_count();
    for _ in 0..food_count {
        world.place_object(Entity::Food(Food::new(starting_energy)), rng)?;
    }

    debug!(
        width,
        height,
        agent_x = position.x,
        agent_y = position.y,
        starting_energy,
        food_count,
        "World initialized"
    );

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodgrid_core::{Direction, Error, Position};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn check_invariants(config: &EnvConfig, world: &WorldState) {
        let (w, h) = (config.width, config.height);
        assert!(world.agent.position.is_interior(w, h));
        assert_eq!(world.agent.energy, config.starting_energy());
        assert!(world.agent.carrying.is_none());
        assert_eq!(world.step_count, 0);

        let foods = world.grid.food_positions();
        assert_eq!(foods.len(), config.food_count());
        for pos in &foods {
            assert!(pos.is_interior(w, h));
            assert_ne!(*pos, world.agent.position);
            let payoff = world.grid.get(*pos).and_then(Entity::as_food).map(Food::energy);
            assert_eq!(payoff, Some(config.starting_energy()));
        }

        for (pos, cell) in world.grid.iter() {
            if !pos.is_interior(w, h) {
                assert_eq!(cell, Some(&Entity::Wall), "border cell {} must be a wall", pos);
            }
        }
    }

    #[test]
    fn test_fixed_start() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = EnvConfig::default();
        let world = initialize(&config, &mut rng).unwrap();

        check_invariants(&config, &world);
        assert_eq!(world.agent.position, Position::new(1, 1));
        assert_eq!(world.agent.direction, Direction::East);
        assert_eq!(world.agent.energy, 8.0);
        assert_eq!(world.max_steps, 20);
        assert_eq!(world.mission, "Pickup food to stay alive, make it to 20 steps");
    }

    #[test]
    fn test_all_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for size in [5, 6, 8, 16] {
            for config in [EnvConfig::square(size), EnvConfig::square(size).with_random_start()] {
                let world = initialize(&config, &mut rng).unwrap();
                check_invariants(&config, &world);
            }
        }
    }

    #[test]
    fn test_dense_food() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let config = EnvConfig {
            food_density: 2.5,
            ..EnvConfig::square(10)
        };
        let world = initialize(&config, &mut rng).unwrap();

        assert_eq!(config.food_count(), 25);
        check_invariants(&config, &world);
    }

    #[test]
    fn test_random_start_never_on_food() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let config = EnvConfig::square(5).with_random_start();

        for _ in 0..1000 {
            let world = initialize(&config, &mut rng).unwrap();
            check_invariants(&config, &world);
        }
    }

    #[test]
    fn test_placement_failure_propagates() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // One interior cell, taken by the agent, yet three foods requested
        let config = EnvConfig {
            food_density: 1.0,
            ..EnvConfig::square(3)
        };

        let result = initialize(&config, &mut rng);
        assert!(matches!(result, Err(Error::Placement(_))));
    }
}
