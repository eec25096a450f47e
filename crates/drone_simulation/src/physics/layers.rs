//! Collision Layers Constants
//!
//! Слои для ObstacleField и Rapier CollisionGroups: одни и те же биты.
//!
//! ## Layers:
//! - Layer 1 (0b1 = 1): Reserved
//! - Layer 2 (0b10 = 2): Actors (цель, которую сопровождает дрон)
//! - Layer 3 (0b100 = 4): Environment (стены, колонны, terrain)
//! - Layer 4 (0b1000 = 8): Drones
//!
//! ## Использование:
//! ```rust
//! use drone_simulation::physics::layers::*;
//!
//! let mask = COLLISION_MASK_DRONE_PROBE;
//! assert_ne!(mask & COLLISION_LAYER_ENVIRONMENT, 0);
//! assert_eq!(mask & COLLISION_LAYER_ACTORS, 0);
//! ```

/// Layer 2: Actors (игрок/цель)
pub const COLLISION_LAYER_ACTORS: u32 = 0b10; // 2

/// Layer 3: Environment (статические препятствия)
pub const COLLISION_LAYER_ENVIRONMENT: u32 = 0b100; // 4

/// Layer 4: Drones
pub const COLLISION_LAYER_DRONES: u32 = 0b1000; // 8

/// Mask: дрон коллайдит с окружением и акторами
pub const COLLISION_MASK_DRONE: u32 = COLLISION_LAYER_ACTORS | COLLISION_LAYER_ENVIRONMENT;

/// Mask по умолчанию для probes дрона (forward, clear-path, кандидаты)
///
/// Только Environment: clear-path probe идёт прямо в цель (Actors).
pub const COLLISION_MASK_DRONE_PROBE: u32 = COLLISION_LAYER_ENVIRONMENT;

/// Получить название слоя для debug логов
pub fn get_layer_name(layer_bits: u32) -> &'static str {
    match layer_bits {
        COLLISION_LAYER_ACTORS => "Actors",
        COLLISION_LAYER_ENVIRONMENT => "Environment",
        COLLISION_LAYER_DRONES => "Drones",
        _ => "Unknown",
    }
}
