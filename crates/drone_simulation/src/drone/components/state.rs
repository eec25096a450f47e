//! Behavioral state machine дрона
//!
//! Состояния: Idle, Following, Avoiding, Stuck, Alert (терминального нет).
//!
//! Правила:
//! - Начальное Following выставляется при активации, не при создании
//! - Обычные переходы: не чаще одного раза за cooldown (0.5s), приоритет:
//!   Alert (near obstacle) > Avoiding (нет clear path) > Stuck (удерживаем) > Idle (2s низкой скорости) > Following
//! - Stuck детектор работает на своём интервале, независимо от cooldown
//! - `force()` обходит cooldown и приоритеты (imminent collision от навигации)
//!
//! Машина не знает про ECS events: каждый метод возвращает `StateTransition`,
//! система публикует его как `DroneStateChanged`.

use bevy::prelude::*;

use crate::drone::config::DroneConfig;

/// Сколько секунд низкой скорости до Idle
pub const IDLE_TIME_THRESHOLD: f32 = 2.0;
/// Смещение между stuck-проверками ниже этого → "не двигаемся"
pub const STUCK_DISPLACEMENT_THRESHOLD: f32 = 0.05;
/// Минимальный интервал между обычными переходами (секунды)
pub const DEFAULT_STATE_CHANGE_COOLDOWN: f32 = 0.5;
/// Интервал stuck-проверок (секунды)
pub const DEFAULT_STUCK_CHECK_INTERVAL: f32 = 0.5;

/// Поведенческое состояние дрона
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum DroneState {
    /// Стоим на месте (долго низкая скорость)
    #[default]
    Idle,
    /// Следуем за целью напрямую
    Following,
    /// Путь к цели перекрыт: обходим
    Avoiding,
    /// Не смещаемся: ждём escape impulse
    Stuck,
    /// Препятствие прямо перед носом
    Alert,
}

/// Переход (old → new), единственный канал уведомлений
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: DroneState,
    pub to: DroneState,
}

/// Входы обычной оценки за тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateInputs {
    pub position: Vec3,
    pub speed: f32,
    pub near_obstacle: bool,
    pub has_clear_path: bool,
}

/// State machine дрона (component)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DroneStateMachine {
    current: DroneState,
    previous: DroneState,
    activated: bool,

    /// Минимум между обычными переходами
    pub state_change_cooldown: f32,
    /// Интервал stuck-проверок
    pub stuck_check_interval: f32,

    last_state_change_time: f32,
    last_stuck_check_time: f32,
    last_stuck_position: Vec3,
    stuck_timer: f32,
    idle_timer: f32,
}

impl Default for DroneStateMachine {
    fn default() -> Self {
        Self {
            current: DroneState::Idle,
            previous: DroneState::Idle,
            activated: false,
            state_change_cooldown: DEFAULT_STATE_CHANGE_COOLDOWN,
            stuck_check_interval: DEFAULT_STUCK_CHECK_INTERVAL,
            last_state_change_time: 0.0,
            last_stuck_check_time: 0.0,
            last_stuck_position: Vec3::ZERO,
            stuck_timer: 0.0,
            idle_timer: 0.0,
        }
    }
}

impl DroneStateMachine {
    pub fn new(state_change_cooldown: f32, stuck_check_interval: f32) -> Self {
        Self {
            state_change_cooldown,
            stuck_check_interval,
            ..default()
        }
    }

    pub fn current(&self) -> DroneState {
        self.current
    }

    pub fn previous(&self) -> DroneState {
        self.previous
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn stuck_timer(&self) -> f32 {
        self.stuck_timer
    }

    pub fn idle_timer(&self) -> f32 {
        self.idle_timer
    }

    pub fn last_state_change_time(&self) -> f32 {
        self.last_state_change_time
    }

    /// Following или Avoiding
    pub fn is_moving(&self) -> bool {
        matches!(self.current, DroneState::Following | DroneState::Avoiding)
    }

    /// Alert или Stuck
    pub fn is_in_alert(&self) -> bool {
        matches!(self.current, DroneState::Alert | DroneState::Stuck)
    }

    /// Активация: запоминаем позицию для stuck-детектора, переходим в Following
    pub fn activate(&mut self, now: f32, position: Vec3) -> StateTransition {
        self.activated = true;
        self.last_stuck_position = position;
        self.last_stuck_check_time = now;
        self.change_state(DroneState::Following, now)
    }

    /// Принудительный переход (мимо cooldown и приоритетов)
    ///
    /// Если уже в этом состоянии: только обновляем timestamp cooldown, без уведомления.
    pub fn force(&mut self, state: DroneState, now: f32) -> Option<StateTransition> {
        if self.current == state {
            self.last_state_change_time = now;
            return None;
        }
        Some(self.change_state(state, now))
    }

    /// Один тик: stuck-детектор (свой интервал) + обычная оценка (под cooldown)
    pub fn update(
        &mut self,
        now: f32,
        delta: f32,
        inputs: &StateInputs,
        config: &DroneConfig,
    ) -> Option<StateTransition> {
        if let Some(stuck) = self.check_if_stuck(now, inputs.position, config) {
            return Some(stuck);
        }

        // Под cooldown пропускаем всю оценку (включая idle таймер)
        if now - self.last_state_change_time < self.state_change_cooldown {
            return None;
        }

        let new_state = self.determine_state(delta, inputs, config);
        (new_state != self.current).then(|| self.change_state(new_state, now))
    }

    fn determine_state(&mut self, delta: f32, inputs: &StateInputs, config: &DroneConfig) -> DroneState {
        if inputs.near_obstacle {
            return DroneState::Alert;
        }

        if !inputs.has_clear_path {
            return DroneState::Avoiding;
        }

        // Выход из Stuck: только через recovery (impulse) или force
        if self.current == DroneState::Stuck {
            return DroneState::Stuck;
        }

        if inputs.speed < config.idle_threshold {
            self.idle_timer += delta;
            if self.idle_timer >= IDLE_TIME_THRESHOLD {
                self.idle_timer = 0.0;
                return DroneState::Idle;
            }
            // Ещё не 2s: остаёмся в Following, таймер продолжает копиться
        } else {
            self.idle_timer = 0.0;
        }

        DroneState::Following
    }

    /// Stuck hysteresis: копим медленно, спадаем на тот же шаг (не ниже нуля)
    fn check_if_stuck(&mut self, now: f32, position: Vec3, config: &DroneConfig) -> Option<StateTransition> {
        if now - self.last_stuck_check_time < self.stuck_check_interval {
            return None;
        }

        self.last_stuck_check_time = now;

        let distance_moved = position.distance(self.last_stuck_position);
        self.last_stuck_position = position;

        if distance_moved < STUCK_DISPLACEMENT_THRESHOLD && self.current != DroneState::Idle {
            self.stuck_timer += self.stuck_check_interval;

            if self.stuck_timer >= config.stuck_time_threshold {
                self.stuck_timer = 0.0;
                // Повторное обнаружение в Stuck тоже уведомляет → recovery impulse ещё раз
                return Some(self.change_state(DroneState::Stuck, now));
            }
        } else {
            self.stuck_timer = (self.stuck_timer - self.stuck_check_interval).max(0.0);
        }

        None
    }

    fn change_state(&mut self, state: DroneState, now: f32) -> StateTransition {
        self.previous = self.current;
        self.current = state;
        self.last_state_change_time = now;

        StateTransition {
            from: self.previous,
            to: self.current,
        }
    }
}
