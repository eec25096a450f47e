//! DroneConfig: параметры следования, движения, избегания препятствий
//!
//! Загружается из внешнего JSON bundle (`DroneConfig::load`), валидируется один раз.
//! Дальше только читается системами (передаётся по ссылке).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::physics::layers::COLLISION_MASK_DRONE_PROBE;

/// Минимум направлений: direct, forward, up, direct+up
pub const MIN_SAMPLE_DIRECTIONS: usize = 4;
/// Верхняя граница (размер fixed-capacity буфера кандидатов)
pub const MAX_SAMPLE_DIRECTIONS: usize = 16;

/// Ошибки загрузки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read drone config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse drone config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("drone config field `{field}` must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
}

/// Параметры дрона
///
/// Инварианты (после `validated()`):
/// - все дистанции/скорости/времена > 0
/// - MIN_SAMPLE_DIRECTIONS ≤ sample_directions ≤ MAX_SAMPLE_DIRECTIONS
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct DroneConfig {
    /// Дистанция за спиной цели (метры)
    pub follow_distance: f32,
    /// Высота над целью (метры)
    pub height_offset: f32,
    /// Смещение вправо от цели (метры)
    pub horizontal_offset: f32,

    /// Базовая скорость (m/s)
    pub move_speed: f32,
    /// Скорость поворота (множитель slerp за секунду)
    pub rotation_speed: f32,
    /// Жёсткий лимит скорости (m/s)
    pub max_speed: f32,

    /// Радиус sphere-cast для проверок препятствий
    pub obstacle_check_radius: f32,
    /// Дальность forward probe
    pub look_ahead_distance: f32,
    /// Hit ближе этого → принудительный Alert
    pub alert_distance: f32,
    /// Layer mask для всех probes
    pub obstacle_mask: u32,

    /// Количество кандидатов при обходе (4..=16)
    pub sample_directions: usize,
    /// Дальность probe для каждого кандидата
    pub sample_distance: f32,

    /// SmoothDamp время для velocity
    pub velocity_smooth_time: f32,

    /// Скорость ниже → накопление idle таймера
    pub idle_threshold: f32,
    /// Сколько секунд без смещения до Stuck
    pub stuck_time_threshold: f32,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            follow_distance: 4.0,
            height_offset: 2.0,
            horizontal_offset: 1.5,
            move_speed: 3.0,
            rotation_speed: 4.0,
            max_speed: 8.0,
            obstacle_check_radius: 0.8,
            look_ahead_distance: 3.0,
            alert_distance: 1.5,
            obstacle_mask: COLLISION_MASK_DRONE_PROBE,
            sample_directions: 8,
            sample_distance: 4.0,
            velocity_smooth_time: 0.15,
            idle_threshold: 0.1,
            stuck_time_threshold: 3.0,
        }
    }
}

impl DroneConfig {
    /// Парсинг + валидация JSON bundle
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: DroneConfig = serde_json::from_str(json)?;
        raw.validated()
    }

    /// Загрузка именованного bundle с диска
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Проверка диапазонов + clamp sample_directions
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let positive = [
            ("follow_distance", self.follow_distance),
            ("height_offset", self.height_offset),
            ("horizontal_offset", self.horizontal_offset),
            ("move_speed", self.move_speed),
            ("rotation_speed", self.rotation_speed),
            ("max_speed", self.max_speed),
            ("obstacle_check_radius", self.obstacle_check_radius),
            ("look_ahead_distance", self.look_ahead_distance),
            ("alert_distance", self.alert_distance),
            ("sample_distance", self.sample_distance),
            ("velocity_smooth_time", self.velocity_smooth_time),
            ("idle_threshold", self.idle_threshold),
            ("stuck_time_threshold", self.stuck_time_threshold),
        ];

        for (field, value) in positive {
            // NaN тоже отсекаем (NaN > 0.0 == false)
            if !(value > 0.0) || !value.is_finite() {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        self.sample_directions = self
            .sample_directions
            .clamp(MIN_SAMPLE_DIRECTIONS, MAX_SAMPLE_DIRECTIONS);

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DroneConfig::default().validated().expect("defaults must validate");
        assert_eq!(config, DroneConfig::default());
    }

    #[test]
    fn test_partial_bundle_fills_defaults() {
        let config = DroneConfig::from_json_str(r#"{ "follow_distance": 6.0, "move_speed": 5.0 }"#).expect("valid");

        assert_eq!(config.follow_distance, 6.0);
        assert_eq!(config.move_speed, 5.0);
        assert_eq!(config.max_speed, DroneConfig::default().max_speed);
    }

    #[test]
    fn test_sample_directions_clamped() {
        let low = DroneConfig::from_json_str(r#"{ "sample_directions": 1 }"#).expect("valid");
        assert_eq!(low.sample_directions, MIN_SAMPLE_DIRECTIONS);

        let high = DroneConfig::from_json_str(r#"{ "sample_directions": 100 }"#).expect("valid");
        assert_eq!(high.sample_directions, MAX_SAMPLE_DIRECTIONS);
    }

    #[test]
    fn test_non_positive_rejected() {
        let err = DroneConfig::from_json_str(r#"{ "alert_distance": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { field: "alert_distance", .. }), "{err}");

        let nan = DroneConfig {
            move_speed: f32::NAN,
            ..default()
        };
        assert!(matches!(
            nan.validated(),
            Err(ConfigError::NonPositive { field: "move_speed", .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = DroneConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = DroneConfig::load("/definitely/not/here/drone.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("drone.json"));
    }
}
