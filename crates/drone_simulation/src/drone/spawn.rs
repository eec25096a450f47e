//! Spawn helpers для дрона

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{Drone, FollowTarget};
use super::config::{ConfigError, DroneConfig};
use crate::physics::layers::{COLLISION_LAYER_DRONES, COLLISION_MASK_DRONE};
use crate::physics::movement::DroneBody;

/// Collision groups дрона (membership: Drones, filter: Actors + Environment)
pub fn drone_groups() -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(COLLISION_LAYER_DRONES),
        Group::from_bits_truncate(COLLISION_MASK_DRONE),
    )
}

/// Spawn дрона с полным набором компонентов:
/// - Drone (Required: state machine, ObstacleSignal, DroneMotion, DroneNavigator, DroneFeedback, DroneBody)
/// - DroneConfig + FollowTarget
/// - Rapier: RigidBody::KinematicPositionBased + Collider::ball + Velocity + CollisionGroups
///
/// Конфиг валидируется до spawn: невалидный → Err, entity не создаётся.
/// Активация (Idle → Following): на первом тике FixedUpdate.
pub fn spawn_drone(
    commands: &mut Commands,
    position: Vec3,
    config: DroneConfig,
    target: Option<Entity>,
) -> Result<Entity, ConfigError> {
    let config = config.validated()?;
    let body = DroneBody::default();

    let drone = commands
        .spawn((
            // Bevy transform
            Transform::from_translation(position),

            // Наши компоненты
            Drone,
            config,
            FollowTarget(target),
            body,

            // Rapier physics
            RigidBody::KinematicPositionBased,
            Collider::ball(body.radius),
            Velocity::default(),
            drone_groups(),
        ))
        .id();

    Ok(drone)
}
