//! Drone events

use bevy::prelude::*;

use super::components::DroneState;
use super::config::DroneConfig;

/// Event: переход состояния дрона (old → new)
///
/// Генерируется:
/// - activate_drones (Idle → Following)
/// - sense_obstacles (force Alert)
/// - update_drone_states (stuck + обычные переходы)
/// - apply_drone_commands (ForceState)
///
/// Обрабатывается:
/// - react_to_state_changes (Idle stop, Stuck impulse, pulse)
/// - log_state_changes
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroneStateChanged {
    pub drone: Entity,
    pub from: DroneState,
    pub to: DroneState,
}

/// Event: внешняя команда дрону (runtime API)
#[derive(Event, Debug, Clone)]
pub enum DroneCommand {
    /// Сменить цель (None = отпустить, дрон перестаёт двигаться)
    SetTarget { drone: Entity, target: Option<Entity> },
    /// Подменить конфиг (уже провалидированный)
    SetConfig { drone: Entity, config: DroneConfig },
    /// Принудительный переход мимо cooldown
    ForceState { drone: Entity, state: DroneState },
}

/// Event: мгновенный impulse (масштабируется массой в actuator)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DroneImpulse {
    pub drone: Entity,
    pub impulse: Vec3,
}

/// Event: fire-and-forget запрос пульсации подсветки
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PulseRequested {
    pub drone: Entity,
    /// Длительность (секунды)
    pub duration: f32,
}

/// Ротация буферов drone событий (аналог `Events::update` из `First`)
///
/// `run_fixed_ticks` гоняет только FixedUpdate, поэтому буферы сами не чистятся.
/// Долгие прогоны вызывают это периодически; события живут ещё один вызов.
pub fn update_drone_events(world: &mut World) {
    world.resource_mut::<Events<DroneStateChanged>>().update();
    world.resource_mut::<Events<DroneCommand>>().update();
    world.resource_mut::<Events<DroneImpulse>>().update();
    world.resource_mut::<Events<PulseRequested>>().update();
}
