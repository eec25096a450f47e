//! Visual feedback дрона (sink)
//!
//! Состояние + intensity → цвета материала и подсветки. Рендера нет:
//! компонент хранит вычисленные параметры, клиент (если есть) их читает.
//! Pulse: fire-and-forget подсветка на Alert/Stuck, навигацию не трогает.

use std::f32::consts::PI;

use bevy::color::LinearRgba;
use bevy::prelude::*;

use crate::drone::components::{DroneMotion, DroneState, DroneStateMachine};
use crate::drone::config::DroneConfig;
use crate::drone::events::PulseRequested;

/// Длительность pulse по умолчанию (секунды)
pub const DEFAULT_PULSE_DURATION: f32 = 0.5;
/// Амплитуда pulse (множитель base color: 1.0 ..= 1.3)
const PULSE_AMPLITUDE: f32 = 0.3;
/// Доля emission от цвета при intensity = 1
const EMISSION_FACTOR: f32 = 0.3;

/// Цвет на каждое состояние
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackPalette {
    pub idle: LinearRgba,
    pub following: LinearRgba,
    pub avoiding: LinearRgba,
    pub stuck: LinearRgba,
    pub alert: LinearRgba,
}

impl Default for FeedbackPalette {
    fn default() -> Self {
        Self {
            idle: LinearRgba::WHITE,
            following: LinearRgba::rgb(0.0, 1.0, 1.0),
            avoiding: LinearRgba::rgb(1.0, 0.92, 0.016),
            stuck: LinearRgba::RED,
            alert: LinearRgba::rgb(1.0, 0.5, 0.0),
        }
    }
}

impl FeedbackPalette {
    pub fn color(&self, state: DroneState) -> LinearRgba {
        match state {
            DroneState::Idle => self.idle,
            DroneState::Following => self.following,
            DroneState::Avoiding => self.avoiding,
            DroneState::Stuck => self.stuck,
            DroneState::Alert => self.alert,
        }
    }
}

/// Активная пульсация
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pulse {
    elapsed: f32,
    duration: f32,
}

impl Pulse {
    /// sin(t·π·4)·0.5 + 0.5, t = elapsed / duration
    fn wave(&self) -> f32 {
        let t = self.elapsed / self.duration;
        (t * PI * 4.0).sin() * 0.5 + 0.5
    }
}

/// Вычисленные параметры материала/подсветки дрона
#[derive(Component, Debug, Clone, PartialEq)]
pub struct DroneFeedback {
    pub palette: FeedbackPalette,
    pub state: DroneState,
    pub intensity: f32,
    pub base_color: LinearRgba,
    pub emission: LinearRgba,
    pub light_color: LinearRgba,
    pub light_intensity: f32,
    pulse: Option<Pulse>,
}

impl Default for DroneFeedback {
    fn default() -> Self {
        Self::with_palette(FeedbackPalette::default())
    }
}

impl DroneFeedback {
    pub fn with_palette(palette: FeedbackPalette) -> Self {
        let mut feedback = Self {
            palette,
            state: DroneState::Idle,
            intensity: 0.0,
            base_color: LinearRgba::BLACK,
            emission: LinearRgba::BLACK,
            light_color: LinearRgba::BLACK,
            light_intensity: 0.0,
            pulse: None,
        };
        feedback.apply(DroneState::Idle, 0.0);
        feedback
    }

    /// state + intensity ∈ [0, 1] → base / emission / light
    pub fn apply(&mut self, state: DroneState, intensity: f32) {
        let intensity = intensity.clamp(0.0, 1.0);
        let color = self.palette.color(state);

        self.state = state;
        self.intensity = intensity;
        self.base_color = scale_rgb(color, 0.5 + intensity * 0.5);
        self.emission = scale_rgb(color, intensity * EMISSION_FACTOR);
        self.light_color = color;
        self.light_intensity = 0.5 + intensity;
    }

    /// Новый pulse перезапускает текущий
    pub fn start_pulse(&mut self, duration: f32) {
        if duration > 0.0 {
            self.pulse = Some(Pulse {
                elapsed: 0.0,
                duration,
            });
        }
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulse.is_some()
    }

    /// Текущий множитель base color (1.0 вне pulse)
    pub fn pulse_multiplier(&self) -> f32 {
        self.pulse
            .map(|pulse| 1.0 + pulse.wave() * PULSE_AMPLITUDE)
            .unwrap_or(1.0)
    }

    /// Base color с учётом pulse (то, что видит рендер)
    pub fn displayed_base_color(&self) -> LinearRgba {
        scale_rgb(self.base_color, self.pulse_multiplier())
    }

    fn advance_pulse(&mut self, delta: f32) {
        if let Some(pulse) = self.pulse.as_mut() {
            pulse.elapsed += delta;
            if pulse.elapsed >= pulse.duration {
                self.pulse = None;
            }
        }
    }
}

/// Умножение RGB (alpha не трогаем)
fn scale_rgb(color: LinearRgba, factor: f32) -> LinearRgba {
    LinearRgba::new(color.red * factor, color.green * factor, color.blue * factor, color.alpha)
}

/// Система: обновление visual feedback
///
/// 1. PulseRequested → start_pulse
/// 2. intensity = clamp01(speed / move_speed), цвета по текущему состоянию
/// 3. pulse таймер
pub fn update_drone_feedback(
    mut pulses: EventReader<PulseRequested>,
    mut drones: Query<(&DroneStateMachine, &DroneMotion, Option<&DroneConfig>, &mut DroneFeedback)>,
    time: Res<Time<Fixed>>,
) {
    for event in pulses.read() {
        if let Ok((_, _, _, mut feedback)) = drones.get_mut(event.drone) {
            feedback.start_pulse(event.duration);
        }
    }

    let delta = time.delta_secs();

    for (machine, motion, config, mut feedback) in drones.iter_mut() {
        if let Some(config) = config {
            let intensity = (motion.speed() / config.move_speed).clamp(0.0, 1.0);
            feedback.apply(machine.current(), intensity);
        }

        feedback.advance_pulse(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_per_state() {
        let palette = FeedbackPalette::default();
        assert_eq!(palette.color(DroneState::Idle), LinearRgba::WHITE);
        assert_eq!(palette.color(DroneState::Following), LinearRgba::rgb(0.0, 1.0, 1.0));
        assert_eq!(palette.color(DroneState::Stuck), LinearRgba::RED);
        assert_eq!(palette.color(DroneState::Alert), LinearRgba::rgb(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_intensity_blending() {
        let mut feedback = DroneFeedback::default();
        feedback.apply(DroneState::Stuck, 1.0);

        assert_eq!(feedback.base_color, LinearRgba::RED);
        assert!((feedback.emission.red - 0.3).abs() < 1e-6);
        assert_eq!(feedback.light_color, LinearRgba::RED);
        assert!((feedback.light_intensity - 1.5).abs() < 1e-6);

        feedback.apply(DroneState::Stuck, 0.0);
        assert!((feedback.base_color.red - 0.5).abs() < 1e-6);
        assert_eq!(feedback.emission.red, 0.0);
        assert!((feedback.light_intensity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_intensity_clamped() {
        let mut feedback = DroneFeedback::default();
        feedback.apply(DroneState::Following, 7.0);
        assert_eq!(feedback.intensity, 1.0);
    }

    #[test]
    fn test_pulse_lifecycle() {
        let mut feedback = DroneFeedback::default();
        assert_eq!(feedback.pulse_multiplier(), 1.0);

        feedback.start_pulse(DEFAULT_PULSE_DURATION);
        assert!(feedback.is_pulsing());

        // t = 0.125 → sin(π/2) = 1 → пик 1.3
        feedback.advance_pulse(DEFAULT_PULSE_DURATION * 0.125);
        assert!((feedback.pulse_multiplier() - 1.3).abs() < 1e-4);

        feedback.advance_pulse(DEFAULT_PULSE_DURATION);
        assert!(!feedback.is_pulsing());
        assert_eq!(feedback.displayed_base_color(), feedback.base_color);
    }

    #[test]
    fn test_new_pulse_restarts() {
        let mut feedback = DroneFeedback::default();
        feedback.start_pulse(0.5);
        feedback.advance_pulse(0.4);

        feedback.start_pulse(0.5);
        feedback.advance_pulse(0.2);
        assert!(feedback.is_pulsing());
    }
}
