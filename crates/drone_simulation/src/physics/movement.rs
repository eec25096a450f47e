//! Motion actuator дрона (headless)
//!
//! Архитектура:
//! - Навигация пишет команду в `DroneMotion.linear/angular`
//! - Impulses приходят событиями `DroneImpulse` (÷ mass)
//! - Linear/angular damping как у rigidbody: v *= 1 / (1 + dt·damping)
//! - Translation блокируется ObstacleField (sphere-cast по ходу движения)
//! - Rapier (RigidBody::KinematicPositionBased) только зеркалит Velocity
//!
//! Детерминизм: fixed timestep (60Hz), без rapier step.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::layers::COLLISION_MASK_DRONE;
use super::probe::{CollisionProbe, ObstacleField};
use crate::drone::components::{Drone, DroneMotion};
use crate::drone::events::DroneImpulse;

/// Зазор до препятствия при блокировке движения (метры)
pub const CONTACT_SKIN: f32 = 0.01;

/// Физическое тело дрона
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DroneBody {
    /// Масса (kg): делитель для impulses
    pub mass: f32,
    /// Linear drag
    pub linear_damping: f32,
    /// Angular drag
    pub angular_damping: f32,
    /// Радиус корпуса (для блокировки движения и Collider::ball)
    pub radius: f32,
}

impl Default for DroneBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            linear_damping: 2.0,
            angular_damping: 3.0,
            radius: 0.3,
        }
    }
}

impl DroneBody {
    /// Δv от мгновенного impulse
    pub fn velocity_change(&self, impulse: Vec3) -> Vec3 {
        impulse / self.mass.max(f32::EPSILON)
    }

    /// Drag за тик (как rigidbody drag: без смены знака при любом dt)
    pub fn damp(&self, motion: &mut DroneMotion, delta: f32) {
        motion.linear *= 1.0 / (1.0 + delta * self.linear_damping);
        motion.angular *= 1.0 / (1.0 + delta * self.angular_damping);
    }
}

/// Сдвиг за тик с учётом препятствий
///
/// Возвращает (фактический сдвиг, заблокировано ли движение).
pub fn blocked_step(
    position: Vec3,
    velocity: Vec3,
    radius: f32,
    delta: f32,
    probe: &dyn CollisionProbe,
) -> (Vec3, bool) {
    let step = velocity * delta;
    let length = step.length();
    if length <= f32::EPSILON {
        return (Vec3::ZERO, false);
    }

    match probe.probe(position, radius, step, length, COLLISION_MASK_DRONE) {
        // Уже внутри препятствия: не держим, даём выбраться
        Some(hit) if hit.distance > 0.0 => {
            let allowed = (hit.distance - CONTACT_SKIN).max(0.0);
            (step / length * allowed, true)
        }
        _ => (step, false),
    }
}

/// Система интеграции motion → Transform
///
/// Порядок: impulses → damping → translation (blocked).
/// Работает в FixedUpdate после навигации (см. DronePlugin).
pub fn integrate_drone_motion(
    mut impulses: EventReader<DroneImpulse>,
    mut drones: Query<(&DroneBody, &mut DroneMotion, &mut Transform), With<Drone>>,
    field: Option<Res<ObstacleField>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for event in impulses.read() {
        let Ok((body, mut motion, _)) = drones.get_mut(event.drone) else {
            continue;
        };
        motion.linear += body.velocity_change(event.impulse);
    }

    let probe = crate::physics::probe::probe_or_clear(field.as_deref());

    for (body, mut motion, mut transform) in drones.iter_mut() {
        body.damp(&mut motion, delta);

        let (step, blocked) = blocked_step(transform.translation, motion.linear, body.radius, delta, probe);
        transform.translation += step;

        if blocked {
            // Упёрлись: гасим скорость (stuck детектор увидит отсутствие смещения)
            motion.linear = Vec3::ZERO;
        }
    }
}

/// Система синхронизации DroneMotion → Rapier Velocity
pub fn sync_motion_to_rapier(mut query: Query<(&DroneMotion, &mut Velocity), With<Drone>>) {
    for (motion, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = motion.linear;
        rapier_velocity.angvel = motion.angular;
    }
}
