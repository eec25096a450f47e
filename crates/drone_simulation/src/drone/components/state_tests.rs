//! Tests for DroneStateMachine.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::state::*;
    use crate::drone::config::DroneConfig;

    const DT: f32 = 1.0 / 60.0;

    fn inputs(position: Vec3, speed: f32) -> StateInputs {
        StateInputs {
            position,
            speed,
            near_obstacle: false,
            has_clear_path: true,
        }
    }

    /// Прогоняет машину тиками по DT, пока `now < until`; возвращает все переходы
    fn run(
        machine: &mut DroneStateMachine,
        now: &mut f32,
        until: f32,
        mut make_inputs: impl FnMut(f32) -> StateInputs,
        config: &DroneConfig,
    ) -> Vec<(f32, StateTransition)> {
        let mut transitions = Vec::new();
        while *now < until {
            *now += DT;
            let sample = make_inputs(*now);
            if let Some(transition) = machine.update(*now, DT, &sample, config) {
                transitions.push((*now, transition));
            }
        }
        transitions
    }

    #[test]
    fn test_initial_state_before_activation() {
        let machine = DroneStateMachine::default();
        assert_eq!(machine.current(), DroneState::Idle);
        assert!(!machine.is_activated());
    }

    #[test]
    fn test_activation_enters_following() {
        let mut machine = DroneStateMachine::default();
        let transition = machine.activate(0.1, Vec3::ZERO);

        assert_eq!(transition, StateTransition { from: DroneState::Idle, to: DroneState::Following });
        assert_eq!(machine.current(), DroneState::Following);
        assert_eq!(machine.previous(), DroneState::Idle);
        assert!(machine.is_moving());
        assert!(!machine.is_in_alert());
    }

    #[test]
    fn test_near_obstacle_beats_everything() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        machine.activate(0.0, Vec3::ZERO);

        let sample = StateInputs {
            position: Vec3::ZERO,
            speed: 0.0,
            near_obstacle: true,
            has_clear_path: false,
        };

        // Под cooldown: ничего
        assert!(machine.update(0.2, DT, &sample, &config).is_none());
        assert_eq!(machine.current(), DroneState::Following);

        // После cooldown: Alert (приоритет 1)
        let transition = machine.update(0.6, DT, &sample, &config).expect("alert");
        assert_eq!(transition.to, DroneState::Alert);
        assert!(machine.is_in_alert());
    }

    #[test]
    fn test_blocked_path_enters_avoiding() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        machine.activate(0.0, Vec3::ZERO);

        let sample = StateInputs {
            has_clear_path: false,
            ..inputs(Vec3::ZERO, 2.0)
        };
        let transition = machine.update(0.6, DT, &sample, &config).expect("avoiding");
        assert_eq!(transition.to, DroneState::Avoiding);

        // Путь снова свободен → Following, но только после cooldown
        let clear = inputs(Vec3::new(1.0, 0.0, 0.0), 2.0);
        assert!(machine.update(0.8, DT, &clear, &config).is_none());
        let transition = machine.update(1.2, DT, &clear, &config).expect("following");
        assert_eq!(transition, StateTransition { from: DroneState::Avoiding, to: DroneState::Following });
    }

    #[test]
    fn test_transitions_respect_cooldown() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        let mut now = 0.0;
        machine.activate(now, Vec3::ZERO);

        // Флаги дёргаются каждый тик: обычные переходы не чаще 1 раза за 0.5s
        let mut tick = 0u32;
        let transitions = run(
            &mut machine,
            &mut now,
            5.0,
            |t| {
                tick += 1;
                StateInputs {
                    position: Vec3::new(t * 3.0, 0.0, 0.0),
                    speed: 3.0,
                    near_obstacle: tick % 2 == 0,
                    has_clear_path: tick % 3 != 0,
                }
            },
            &config,
        );

        assert!(!transitions.is_empty());
        for pair in transitions.windows(2) {
            let gap = pair[1].0 - pair[0].0;
            assert!(gap >= machine.state_change_cooldown - 1e-4, "transitions {:?} too close", pair);
        }
    }

    #[test]
    fn test_idle_after_two_seconds_below_threshold() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        let mut now = 0.0;
        machine.activate(now, Vec3::ZERO);

        // Медленно, но смещаемся (stuck не должен сработать)
        let transitions = run(
            &mut machine,
            &mut now,
            2.4,
            |t| inputs(Vec3::new(t * 0.2, 0.0, 0.0), 0.05),
            &config,
        );
        assert!(transitions.is_empty(), "unexpected {:?}", transitions);
        assert_eq!(machine.current(), DroneState::Following);

        // Idle копится только после cooldown: 0.5 + 2.0
        let transitions = run(
            &mut machine,
            &mut now,
            2.7,
            |t| inputs(Vec3::new(t * 0.2, 0.0, 0.0), 0.05),
            &config,
        );
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].1.to, DroneState::Idle);
        assert_eq!(machine.idle_timer(), 0.0);
    }

    #[test]
    fn test_speed_resets_idle_timer() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        machine.activate(0.0, Vec3::ZERO);

        machine.update(0.6, DT, &inputs(Vec3::new(0.1, 0.0, 0.0), 0.0), &config);
        assert!(machine.idle_timer() > 0.0);

        machine.update(0.7, DT, &inputs(Vec3::new(0.2, 0.0, 0.0), 1.0), &config);
        assert_eq!(machine.idle_timer(), 0.0);
    }

    #[test]
    fn test_stuck_after_threshold_without_displacement() {
        let config = DroneConfig::default(); // stuck_time_threshold = 3.0
        let mut machine = DroneStateMachine::default();
        let mut now = 0.0;
        machine.activate(now, Vec3::ZERO);

        // Скорость "есть" (не Idle), но позиция не меняется
        let transitions = run(&mut machine, &mut now, 3.2, |_| inputs(Vec3::ZERO, 1.0), &config);

        let stuck: Vec<_> = transitions.iter().filter(|(_, t)| t.to == DroneState::Stuck).collect();
        assert_eq!(stuck.len(), 1, "transitions: {:?}", transitions);
        assert!(stuck[0].0 >= 3.0 - 1e-3);
        assert_eq!(machine.current(), DroneState::Stuck);
        assert_eq!(machine.stuck_timer(), 0.0);
    }

    #[test]
    fn test_stuck_is_sticky_under_clear_path() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        machine.activate(0.0, Vec3::ZERO);
        machine.force(DroneState::Stuck, 0.0);

        // Двигаемся, путь свободен: но Stuck держится
        let mut now = 0.0;
        let transitions = run(
            &mut machine,
            &mut now,
            2.0,
            |t| inputs(Vec3::new(t * 2.0, 0.0, 0.0), 2.0),
            &config,
        );
        assert!(transitions.is_empty());
        assert_eq!(machine.current(), DroneState::Stuck);

        // Но препятствие прямо перед носом важнее
        let sample = StateInputs {
            near_obstacle: true,
            ..inputs(Vec3::new(5.0, 0.0, 0.0), 2.0)
        };
        let transition = machine.update(2.5, DT, &sample, &config).expect("alert");
        assert_eq!(transition, StateTransition { from: DroneState::Stuck, to: DroneState::Alert });
    }

    #[test]
    fn test_stuck_timer_decays_and_never_negative() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        let mut now = 0.0;
        machine.activate(now, Vec3::ZERO);

        // ~1s на месте → 2 проверки → 1.0
        run(&mut machine, &mut now, 1.1, |_| inputs(Vec3::ZERO, 1.0), &config);
        assert!((machine.stuck_timer() - 1.0).abs() < 1e-4, "timer = {}", machine.stuck_timer());

        // Одна проверка с движением → спад на 0.5, не сброс
        let start = now;
        run(
            &mut machine,
            &mut now,
            start + 0.5,
            |t| inputs(Vec3::new((t - start) * 4.0, 0.0, 0.0), 1.0),
            &config,
        );
        assert!((machine.stuck_timer() - 0.5).abs() < 1e-4, "timer = {}", machine.stuck_timer());

        // Долгое движение → таймер упирается в 0
        let start = now;
        run(
            &mut machine,
            &mut now,
            start + 3.0,
            |t| inputs(Vec3::new(10.0 + (t - start) * 4.0, 0.0, 0.0), 1.0),
            &config,
        );
        assert_eq!(machine.stuck_timer(), 0.0);
    }

    #[test]
    fn test_stuck_check_ignores_cooldown() {
        let config = DroneConfig {
            stuck_time_threshold: 1.0,
            ..default()
        };
        let mut machine = DroneStateMachine::default();
        machine.activate(0.0, Vec3::ZERO);

        // Постоянные force-переходы держат cooldown, stuck всё равно считается
        let sample = inputs(Vec3::ZERO, 1.0);
        let mut stuck_at = None;
        let mut now = 0.0;
        while now < 1.5 {
            now += DT;
            let target = if machine.current() == DroneState::Alert {
                DroneState::Avoiding
            } else {
                DroneState::Alert
            };
            machine.force(target, now);
            if let Some(t) = machine.update(now, DT, &sample, &config) {
                if t.to == DroneState::Stuck {
                    stuck_at = Some(now);
                    break;
                }
            }
        }

        assert!(stuck_at.is_some(), "stuck detector must run under cooldown");
    }

    #[test]
    fn test_no_stuck_accumulation_while_idle() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        machine.activate(0.0, Vec3::ZERO);
        machine.force(DroneState::Idle, 0.0);

        let mut idle_checks = 0;
        for step in 1..=20 {
            let now = step as f32 * 0.5;
            let state_before = machine.current();
            let timer_before = machine.stuck_timer();

            machine.update(now, 0.5, &inputs(Vec3::ZERO, 0.0), &config);

            if state_before == DroneState::Idle {
                idle_checks += 1;
                assert!(machine.stuck_timer() <= timer_before);
            }
        }

        assert!(idle_checks > 0);
    }

    #[test]
    fn test_force_same_state_is_silent() {
        let config = DroneConfig::default();
        let mut machine = DroneStateMachine::default();
        machine.activate(0.0, Vec3::ZERO);

        assert!(machine.force(DroneState::Alert, 1.0).is_some());
        assert!(machine.force(DroneState::Alert, 1.4).is_none());
        assert_eq!(machine.last_state_change_time(), 1.4);

        // Cooldown отсчитывается от повторного force
        let sample = inputs(Vec3::new(1.0, 0.0, 0.0), 2.0);
        assert!(machine.update(1.7, DT, &sample, &config).is_none());
        assert!(machine.update(1.95, DT, &sample, &config).is_some());
    }
}
