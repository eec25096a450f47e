//! Реакции на переходы состояния (в том же тике, после команды навигации)

use bevy::prelude::*;

use crate::drone::components::{DroneMotion, DroneState};
use crate::drone::events::{DroneImpulse, DroneStateChanged, PulseRequested};
use crate::drone::steering::ESCAPE_IMPULSE;
use crate::feedback::DEFAULT_PULSE_DURATION;

/// Система: реакция на DroneStateChanged
///
/// - Idle → полная остановка (перекрывает команду этого тика)
/// - Stuck → escape impulse вверх (actuator применит в этом же тике)
/// - Alert / Stuck → pulse подсветки
pub fn react_to_state_changes(
    mut state_events: EventReader<DroneStateChanged>,
    mut drones: Query<&mut DroneMotion>,
    mut impulses: EventWriter<DroneImpulse>,
    mut pulses: EventWriter<PulseRequested>,
) {
    for event in state_events.read() {
        match event.to {
            DroneState::Idle => {
                if let Ok(mut motion) = drones.get_mut(event.drone) {
                    motion.halt();
                }
            }
            DroneState::Stuck => {
                impulses.write(DroneImpulse {
                    drone: event.drone,
                    impulse: Vec3::Y * ESCAPE_IMPULSE,
                });
            }
            _ => {}
        }

        if matches!(event.to, DroneState::Alert | DroneState::Stuck) {
            pulses.write(PulseRequested {
                drone: event.drone,
                duration: DEFAULT_PULSE_DURATION,
            });
        }
    }
}

/// Система: лог переходов (observer)
pub fn log_state_changes(mut state_events: EventReader<DroneStateChanged>) {
    for event in state_events.read() {
        crate::log_info(&format!("🚁 Drone {:?}: {:?} → {:?}", event.drone, event.from, event.to));
    }
}
