//! Named environment variants.

use crate::env::FoodEnv;
use foodgrid_core::{EnvConfig, Error, Result};

/// Identifiers of every registered variant
pub const VARIANT_IDS: [&str; 5] = [
    "MiniGrid-Food-5x5-v0",
    "MiniGrid-Food-Random-5x5-v0",
    "MiniGrid-Food-6x6-v0",
    "MiniGrid-Food-Random-6x6-v0",
    "MiniGrid-Food-16x16-v0",
];

/// Configuration bound to a variant identifier
pub fn lookup(id: &str) -> Result<EnvConfig> {
    let config = match id {
        "MiniGrid-Food-5x5-v0" => EnvConfig::square(5),
        "MiniGrid-Food-Random-5x5-v0" => EnvConfig::square(5).with_random_start(),
        "MiniGrid-Food-6x6-v0" => EnvConfig::square(6),
        "MiniGrid-Food-Random-6x6-v0" => EnvConfig::square(6).with_random_start(),
        "MiniGrid-Food-16x16-v0" => EnvConfig::square(16),
        other => return Err(Error::UnknownVariant(other.to_string())),
    };
    Ok(config)
}

/// Instantiate a registered variant with the given seed
pub fn make(id: &str, seed: u64) -> Result<FoodEnv> {
    FoodEnv::new(lookup(id)?.with_seed(seed))
}
