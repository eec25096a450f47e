//! Navigation system: направление → скорость → SmoothDamp → команда → поворот

use bevy::prelude::*;

use crate::drone::components::{
    Drone, DroneMotion, DroneNavigator, DroneStateMachine, FollowTarget, ObstacleSignal,
};
use crate::drone::config::DroneConfig;
use crate::drone::steering::{
    commit_velocity, rotation_step, select_direction, smooth_damp, target_speed, SteeringInputs, TargetPose,
};
use crate::physics::probe::{probe_or_clear, ObstacleField};

/// Система: навигация дрона за тик
///
/// Состояние уже разрешено (sense_obstacles + update_drone_states идут раньше).
/// Без цели или конфига: no-op (одна запись в лог на entity, пока не починят).
pub fn steer_drones(
    mut drones: Query<
        (
            Entity,
            &mut Transform,
            &FollowTarget,
            Option<&DroneConfig>,
            &DroneStateMachine,
            &ObstacleSignal,
            &mut DroneMotion,
            &mut DroneNavigator,
        ),
        With<Drone>,
    >,
    targets: Query<&Transform, Without<Drone>>,
    field: Option<Res<ObstacleField>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let probe = probe_or_clear(field.as_deref());

    for (entity, mut transform, follow, config, machine, signal, mut motion, mut navigator) in drones.iter_mut() {
        let target = follow.0.and_then(|target| targets.get(target).ok());

        let (Some(config), Some(target)) = (config, target) else {
            if !navigator.missing_logged {
                navigator.missing_logged = true;
                crate::log_warning(&format!(
                    "Drone {:?}: no target or config → navigation skipped (config: {}, target: {:?})",
                    entity,
                    config.is_some(),
                    follow.0
                ));
            }
            navigator.follow_point = None;
            continue;
        };
        navigator.missing_logged = false;

        let pose = TargetPose::from_transform(target);
        let follow_point = pose.follow_point(config);
        let position = transform.translation;

        let inputs = SteeringInputs {
            position,
            forward: transform.forward().as_vec3(),
            follow_point,
            near_obstacle: signal.near_obstacle,
            has_clear_path: signal.has_clear_path,
        };
        let direction = select_direction(&inputs, config, probe);
        let speed = target_speed(machine.current(), position.distance(follow_point), config);

        let mut smoothing_velocity = motion.smoothing_velocity;
        let smoothed = smooth_damp(
            motion.smoothed,
            direction * speed,
            &mut smoothing_velocity,
            config.velocity_smooth_time,
            f32::INFINITY,
            delta,
        );
        motion.smoothed = smoothed;
        motion.smoothing_velocity = smoothing_velocity;
        motion.linear = commit_velocity(smoothed, config);

        match rotation_step(transform.rotation, motion.linear, config, delta) {
            Some(rotation) => transform.rotation = rotation,
            None => motion.angular = Vec3::ZERO,
        }

        navigator.follow_point = Some(follow_point);
        navigator.direction = direction;
        navigator.desired_speed = speed;
    }
}
