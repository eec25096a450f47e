//! Physics layer дрона
//!
//! - layers: collision layers (общие биты для ObstacleField и Rapier)
//! - probe: sphere-cast запросы (CollisionProbe)
//! - movement: headless actuator (velocity → Transform) + sync в Rapier

pub mod layers;
pub mod movement;
pub mod probe;

pub use layers::*;
pub use movement::*;
pub use probe::*;
