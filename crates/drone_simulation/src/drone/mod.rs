//! Drone domain: follow-and-avoid навигация
//!
//! Содержит:
//! - DroneConfig (параметры, JSON bundle)
//! - DroneStateMachine (Idle/Following/Avoiding/Stuck/Alert)
//! - steering (чистая математика навигации)
//! - events (DroneStateChanged, DroneCommand, DroneImpulse, PulseRequested)
//! - systems (ECS обвязка)

use bevy::prelude::*;

pub mod components;
pub mod config;
pub mod events;
pub mod spawn;
pub mod steering;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use config::{ConfigError, DroneConfig};
pub use events::*;
pub use spawn::spawn_drone;

use crate::feedback::update_drone_feedback;
use crate::physics::movement::{integrate_drone_motion, sync_motion_to_rapier};

/// Drone Plugin
///
/// Регистрирует drone системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. activate_drones: Idle → Following для новых дронов
/// 2. apply_drone_commands: SetTarget / SetConfig / ForceState (после активации: force не перезаписывается)
/// 3. sense_obstacles: forward probe (force Alert) + clear-path probe
/// 4. update_drone_states: stuck детектор + обычные переходы
/// 5. steer_drones: направление, скорость, SmoothDamp, поворот
/// 6. react_to_state_changes: Idle stop, Stuck impulse, pulse
/// 7. log_state_changes
/// 8. update_drone_feedback: цвета/подсветка
/// 9. integrate_drone_motion → sync_motion_to_rapier
pub struct DronePlugin;

impl Plugin for DronePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DroneStateChanged>()
            .add_event::<DroneCommand>()
            .add_event::<DroneImpulse>()
            .add_event::<PulseRequested>()
            .register_type::<DroneConfig>()
            .register_type::<DroneStateMachine>()
            .add_systems(
                FixedUpdate,
                (
                    systems::activate_drones,
                    systems::apply_drone_commands,
                    systems::sense_obstacles,
                    systems::update_drone_states,
                    systems::steer_drones,
                    systems::react_to_state_changes,
                    systems::log_state_changes,
                    update_drone_feedback,
                    integrate_drone_motion,
                    sync_motion_to_rapier,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            );
    }
}
