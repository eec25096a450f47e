//! State machine systems: активация + stuck/cooldown оценка

use bevy::prelude::*;

use crate::drone::components::{Drone, DroneMotion, DroneStateMachine, FollowTarget, ObstacleSignal, StateInputs};
use crate::drone::config::DroneConfig;
use crate::drone::events::DroneStateChanged;

/// Система: активация новых дронов (Idle → Following)
///
/// Активация не зависит от цели/конфига: машина стартует сразу после spawn.
pub fn activate_drones(
    mut drones: Query<(Entity, &Transform, &mut DroneStateMachine), With<Drone>>,
    mut state_events: EventWriter<DroneStateChanged>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();

    for (entity, transform, mut machine) in drones.iter_mut() {
        if machine.is_activated() {
            continue;
        }

        let transition = machine.activate(now, transform.translation);
        state_events.write(DroneStateChanged {
            drone: entity,
            from: transition.from,
            to: transition.to,
        });
    }
}

/// Система: обновление state machine
///
/// Входы: позиция, скорость (после actuator прошлого тика), ObstacleSignal этого тика.
/// Без цели или конфига: пропускаем (навигация тоже no-op).
pub fn update_drone_states(
    mut drones: Query<
        (
            Entity,
            &Transform,
            &FollowTarget,
            Option<&DroneConfig>,
            &ObstacleSignal,
            &DroneMotion,
            &mut DroneStateMachine,
        ),
        With<Drone>,
    >,
    targets: Query<(), (With<Transform>, Without<Drone>)>,
    mut state_events: EventWriter<DroneStateChanged>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    for (entity, transform, follow, config, signal, motion, mut machine) in drones.iter_mut() {
        let Some(config) = config else {
            continue;
        };
        if !follow.0.is_some_and(|target| targets.contains(target)) || !machine.is_activated() {
            continue;
        }

        let inputs = StateInputs {
            position: transform.translation,
            speed: motion.speed(),
            near_obstacle: signal.near_obstacle,
            has_clear_path: signal.has_clear_path,
        };

        if let Some(transition) = machine.update(now, delta, &inputs, config) {
            state_events.write(DroneStateChanged {
                drone: entity,
                from: transition.from,
                to: transition.to,
            });
        }
    }
}
