//! Obstacle sensing: forward probe (каждый тик) + clear-path probe (периодически)

use bevy::prelude::*;

use crate::drone::components::{Drone, DroneState, DroneStateMachine, FollowTarget, ObstacleSignal};
use crate::drone::config::DroneConfig;
use crate::drone::events::DroneStateChanged;
use crate::drone::steering::{CLEAR_PATH_INTERVAL, CLEAR_PATH_NEAR};
use crate::physics::probe::{probe_or_clear, CollisionProbe, ObstacleField, ProbeHit};

/// Forward sphere-cast на look_ahead_distance
pub fn probe_forward(
    position: Vec3,
    forward: Vec3,
    config: &DroneConfig,
    probe: &dyn CollisionProbe,
) -> Option<ProbeHit> {
    probe.probe(
        position,
        config.obstacle_check_radius,
        forward,
        config.look_ahead_distance,
        config.obstacle_mask,
    )
}

/// Свободен ли путь до цели (радиус probe вдвое меньше; цель ближе 1м: свободен)
pub fn check_clear_path(
    position: Vec3,
    target_position: Vec3,
    config: &DroneConfig,
    probe: &dyn CollisionProbe,
) -> bool {
    let to_target = target_position - position;
    let distance = to_target.length();

    if distance < CLEAR_PATH_NEAR {
        return true;
    }

    probe
        .probe(
            position,
            config.obstacle_check_radius * 0.5,
            to_target,
            distance,
            config.obstacle_mask,
        )
        .is_none()
}

/// Система: обновление ObstacleSignal
///
/// Hit ближе alert_distance → force(Alert) сразу (мимо cooldown),
/// до оценки состояния и навигации в этом же тике.
pub fn sense_obstacles(
    mut drones: Query<
        (
            Entity,
            &Transform,
            &FollowTarget,
            Option<&DroneConfig>,
            &mut ObstacleSignal,
            &mut DroneStateMachine,
        ),
        With<Drone>,
    >,
    targets: Query<&Transform, Without<Drone>>,
    field: Option<Res<ObstacleField>>,
    mut state_events: EventWriter<DroneStateChanged>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();
    let probe = probe_or_clear(field.as_deref());

    for (entity, transform, follow, config, mut signal, mut machine) in drones.iter_mut() {
        let Some(config) = config else {
            continue;
        };
        let Some(target) = follow.0.and_then(|target| targets.get(target).ok()) else {
            continue;
        };

        let position = transform.translation;

        let hit = probe_forward(position, transform.forward().as_vec3(), config, probe);
        signal.near_obstacle = hit.is_some();
        signal.last_forward_hit = hit.map(|hit| hit.distance);

        if let Some(hit) = hit {
            if hit.distance < config.alert_distance {
                if let Some(transition) = machine.force(DroneState::Alert, now) {
                    crate::log(&format!(
                        "⚠️ Drone {:?}: obstacle {:?} at {:.2}m → Alert",
                        entity, hit.obstacle, hit.distance
                    ));
                    state_events.write(DroneStateChanged {
                        drone: entity,
                        from: transition.from,
                        to: transition.to,
                    });
                }
            }
        }

        if now - signal.last_path_check > CLEAR_PATH_INTERVAL {
            signal.has_clear_path = check_clear_path(position, target.translation, config, probe);
            signal.last_path_check = now;
        }
    }
}
