//! Steering math: follow point, выбор направления, скорость, сглаживание, поворот
//!
//! Чистые функции без ECS: системы (`systems::navigation`) только собирают входы
//! из компонентов и вызывают их. Collision запросы идут через `CollisionProbe`.

use std::f32::consts::TAU;

use bevy::prelude::*;

use super::components::DroneState;
use super::config::{DroneConfig, MAX_SAMPLE_DIRECTIONS};
use crate::physics::probe::CollisionProbe;

/// Ближе к follow point → стоим (направление ZERO)
pub const ARRIVAL_DISTANCE: f32 = 0.5;
/// Минимальный интервал clear-path проверок (секунды)
pub const CLEAR_PATH_INTERVAL: f32 = 0.3;
/// Цель ближе этого → путь считается свободным без probe
pub const CLEAR_PATH_NEAR: f32 = 1.0;
/// Deadband для скорости (команда) и для поворота
pub const VELOCITY_DEADBAND: f32 = 0.1;
/// Escape impulse при входе в Stuck (вверх)
pub const ESCAPE_IMPULSE: f32 = 5.0;

const SAFETY_WEIGHT: f32 = 0.6;
const ALIGNMENT_WEIGHT: f32 = 0.4;

/// Поза цели: позиция + оси (forward/right)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPose {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
}

impl TargetPose {
    /// Bevy convention: forward = −Z, right = +X
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            forward: transform.forward().as_vec3(),
            right: transform.right().as_vec3(),
        }
    }

    /// Точка за спиной цели: назад, вправо, вверх
    pub fn follow_point(&self, config: &DroneConfig) -> Vec3 {
        self.position - self.forward * config.follow_distance
            + self.right * config.horizontal_offset
            + Vec3::Y * config.height_offset
    }
}

/// Входы выбора направления за тик
#[derive(Debug, Clone, Copy)]
pub struct SteeringInputs {
    pub position: Vec3,
    /// Текущий forward дрона (кандидат "продолжать как летим")
    pub forward: Vec3,
    pub follow_point: Vec3,
    pub near_obstacle: bool,
    pub has_clear_path: bool,
}

/// Fixed-capacity буфер кандидатов (без аллокаций на тик)
#[derive(Debug, Clone, Copy)]
pub struct AvoidanceCandidates {
    directions: [Vec3; MAX_SAMPLE_DIRECTIONS],
    len: usize,
}

impl AvoidanceCandidates {
    /// direct, forward, up, direct+up, затем `sample_directions − 4` поворотов direct вокруг Y
    pub fn generate(direct: Vec3, forward: Vec3, sample_directions: usize) -> Self {
        let count = sample_directions.min(MAX_SAMPLE_DIRECTIONS);
        let mut candidates = Self {
            directions: [Vec3::ZERO; MAX_SAMPLE_DIRECTIONS],
            len: 0,
        };

        candidates.push(direct);
        candidates.push(forward);
        candidates.push(Vec3::Y);
        candidates.push((direct + Vec3::Y).normalize_or_zero());

        let rotations = count.saturating_sub(4);
        for i in 0..rotations {
            let angle = i as f32 / rotations as f32 * TAU;
            candidates.push((Quat::from_rotation_y(angle) * direct).normalize_or_zero());
        }

        candidates
    }

    fn push(&mut self, direction: Vec3) {
        if self.len < MAX_SAMPLE_DIRECTIONS {
            self.directions[self.len] = direction;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.directions[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Safety кандидата: 1.0 если probe чистый, иначе clamp01(hit / sample_distance × 2)
pub fn direction_safety(
    origin: Vec3,
    direction: Vec3,
    config: &DroneConfig,
    probe: &dyn CollisionProbe,
) -> f32 {
    match probe.probe(
        origin,
        config.obstacle_check_radius,
        direction,
        config.sample_distance,
        config.obstacle_mask,
    ) {
        None => 1.0,
        Some(hit) => (hit.distance / config.sample_distance * 2.0).clamp(0.0, 1.0),
    }
}

/// Score = 0.6 × safety + 0.4 × alignment
pub fn score_direction(
    origin: Vec3,
    direction: Vec3,
    direct: Vec3,
    config: &DroneConfig,
    probe: &dyn CollisionProbe,
) -> f32 {
    let safety = direction_safety(origin, direction, config, probe);
    let alignment = direction.dot(direct) * 0.5 + 0.5;
    safety * SAFETY_WEIGHT + alignment * ALIGNMENT_WEIGHT
}

/// Лучший кандидат обхода (строго больший score; при равенстве: первый)
pub fn best_avoidance_direction(
    origin: Vec3,
    direct: Vec3,
    forward: Vec3,
    config: &DroneConfig,
    probe: &dyn CollisionProbe,
) -> Vec3 {
    let candidates = AvoidanceCandidates::generate(direct, forward, config.sample_directions);

    let mut best_direction = direct;
    let mut best_score = f32::NEG_INFINITY;

    for &candidate in candidates.as_slice() {
        let score = score_direction(origin, candidate, direct, config, probe);
        if score > best_score {
            best_score = score;
            best_direction = candidate;
        }
    }

    best_direction
}

/// Желаемое направление: ZERO у точки, direct если путь свободен, иначе обход
pub fn select_direction(inputs: &SteeringInputs, config: &DroneConfig, probe: &dyn CollisionProbe) -> Vec3 {
    let to_point = inputs.follow_point - inputs.position;
    let distance = to_point.length();

    if distance < ARRIVAL_DISTANCE {
        return Vec3::ZERO;
    }

    let direct = to_point / distance;

    if inputs.has_clear_path && !inputs.near_obstacle {
        return direct;
    }

    best_avoidance_direction(inputs.position, direct, inputs.forward, config, probe)
}

/// Желаемая скорость от состояния и дистанции до follow point
pub fn target_speed(state: DroneState, distance: f32, config: &DroneConfig) -> f32 {
    if matches!(state, DroneState::Idle | DroneState::Stuck) {
        return 0.0;
    }

    if distance > config.follow_distance * 1.5 {
        config.move_speed
    } else if distance < config.follow_distance * 0.7 {
        // Слишком близко: медленно отходим
        -config.move_speed * 0.2
    } else {
        config.move_speed * 0.3
    }
}

/// Critically damped SmoothDamp (экспоненциальная аппроксимация + защита от overshoot)
///
/// `velocity`: аккумулятор, переносится между тиками.
pub fn smooth_damp(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    max_speed: f32,
    delta: f32,
) -> Vec3 {
    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;

    let x = omega * delta;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let original_target = target;
    let mut change = current - target;

    let max_change = max_speed * smooth_time;
    if max_change.is_finite() {
        change = change.clamp_length_max(max_change);
    }
    let target = current - change;

    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * exp;

    let mut output = target + (change + temp) * exp;

    // Не проскакиваем цель
    if (original_target - current).dot(output - original_target) > 0.0 {
        output = original_target;
        *velocity = Vec3::ZERO;
    }

    output
}

/// Команда скорости: deadband → ровно ZERO, иначе clamp до max_speed
pub fn commit_velocity(smoothed: Vec3, config: &DroneConfig) -> Vec3 {
    if smoothed.length() < VELOCITY_DEADBAND {
        return Vec3::ZERO;
    }
    smoothed.clamp_length_max(config.max_speed)
}

/// Шаг поворота к направлению движения
///
/// None: скорость ниже deadband (angular обнуляется, ориентация держится).
/// Some(rotation): новая ориентация (может совпадать с текущей, если направление вырождено).
pub fn rotation_step(current: Quat, velocity: Vec3, config: &DroneConfig, delta: f32) -> Option<Quat> {
    let speed = velocity.length();
    if speed < VELOCITY_DEADBAND {
        return None;
    }

    let look_direction = velocity.normalize_or_zero();
    if look_direction.length() <= 0.01 {
        return Some(current);
    }

    let target = Transform::IDENTITY.looking_to(look_direction, Vec3::Y).rotation;

    // Быстрее летим → быстрее поворачиваем
    let speed_factor = (speed / config.move_speed).clamp(0.0, 1.0);
    let rate = config.rotation_speed * speed_factor;

    Some(current.slerp(target, (delta * rate).clamp(0.0, 1.0)))
}
