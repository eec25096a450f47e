//! Drone systems (порядок см. DronePlugin)

pub mod commands;
pub mod navigation;
pub mod reactions;
pub mod sensing;
pub mod state;

// Re-export all systems
pub use commands::*;
pub use navigation::*;
pub use reactions::*;
pub use sensing::*;
pub use state::*;
