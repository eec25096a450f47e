//! Navigation components: цель, сигналы препятствий, скорость, debug геометрия

use bevy::prelude::*;

use super::state::DroneStateMachine;
use crate::feedback::DroneFeedback;
use crate::physics::movement::DroneBody;

/// Marker дрона (Required: state machine, navigation state, motion, feedback)
///
/// DroneConfig НЕ required: без него навигация no-op (логируется один раз на entity).
/// FollowTarget required, но по умолчанию пустой: тоже no-op.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    DroneStateMachine,
    FollowTarget,
    ObstacleSignal,
    DroneMotion,
    DroneNavigator,
    DroneBody,
    DroneFeedback
)]
pub struct Drone;

/// Цель сопровождения (weak reference: despawn цели = отсутствие цели)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct FollowTarget(pub Option<Entity>);

impl FollowTarget {
    pub fn new(target: Entity) -> Self {
        Self(Some(target))
    }
}

/// Сигналы препятствий за тик
///
/// `has_clear_path` кэшируется между периодическими проверками (≥0.3s).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ObstacleSignal {
    pub near_obstacle: bool,
    pub has_clear_path: bool,
    /// Время последней clear-path проверки (секунды симуляции)
    pub last_path_check: f32,
    /// Дистанция последнего forward hit (None = чисто)
    pub last_forward_hit: Option<f32>,
}

impl Default for ObstacleSignal {
    fn default() -> Self {
        Self {
            near_obstacle: false,
            has_clear_path: true,
            last_path_check: 0.0,
            last_forward_hit: None,
        }
    }
}

/// Скорость дрона + SmoothDamp аккумулятор
///
/// `linear`/`angular`: команда для actuator (см. physics::movement).
/// `smoothed`/`smoothing_velocity`: состояние сглаживания между тиками.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DroneMotion {
    pub linear: Vec3,
    pub angular: Vec3,
    pub smoothed: Vec3,
    pub smoothing_velocity: Vec3,
}

impl DroneMotion {
    pub fn speed(&self) -> f32 {
        self.linear.length()
    }

    /// Полная остановка (Idle reaction)
    pub fn halt(&mut self) {
        self.linear = Vec3::ZERO;
        self.angular = Vec3::ZERO;
    }
}

/// Debug геометрия последнего тика навигации (вместо gizmo)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DroneNavigator {
    /// Follow point за спиной цели
    pub follow_point: Option<Vec3>,
    /// Выбранное направление (ZERO = на месте)
    pub direction: Vec3,
    /// Желаемая скорость до сглаживания
    pub desired_speed: f32,
    /// Уже залогировали отсутствие цели/конфига (reset при появлении)
    #[reflect(ignore)]
    pub(crate) missing_logged: bool,
}
