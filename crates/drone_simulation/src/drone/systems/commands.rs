//! Runtime API дрона: смена цели, конфига, принудительное состояние

use bevy::prelude::*;

use crate::drone::components::{Drone, DroneNavigator, DroneStateMachine, FollowTarget};
use crate::drone::config::DroneConfig;
use crate::drone::events::{DroneCommand, DroneStateChanged};

/// Система: применение DroneCommand событий
///
/// Работает сразу после активации: команды видны уже в этом же тике,
/// ForceState для только что заспавненного дрона не теряется.
/// SetConfig повторно валидирует bundle; невалидный отбрасывается с ошибкой в лог.
pub fn apply_drone_commands(
    mut commands: Commands,
    mut drone_commands: EventReader<DroneCommand>,
    mut drones: Query<
        (
            &mut FollowTarget,
            Option<&mut DroneConfig>,
            &mut DroneStateMachine,
            &mut DroneNavigator,
        ),
        With<Drone>,
    >,
    mut state_events: EventWriter<DroneStateChanged>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();

    for command in drone_commands.read() {
        match command {
            DroneCommand::SetTarget { drone, target } => {
                let Ok((mut follow, _, _, mut navigator)) = drones.get_mut(*drone) else {
                    crate::log_warning(&format!("SetTarget: drone {:?} not found", drone));
                    continue;
                };

                follow.0 = *target;
                navigator.missing_logged = false;
                crate::log(&format!("🎯 Drone {:?}: target → {:?}", drone, target));
            }
            DroneCommand::SetConfig { drone, config } => {
                let Ok((_, current, _, mut navigator)) = drones.get_mut(*drone) else {
                    crate::log_warning(&format!("SetConfig: drone {:?} not found", drone));
                    continue;
                };

                let validated = match config.clone().validated() {
                    Ok(validated) => validated,
                    Err(err) => {
                        crate::log_error(&format!("SetConfig: drone {:?} rejected config: {}", drone, err));
                        continue;
                    }
                };

                match current {
                    Some(mut current) => *current = validated,
                    None => {
                        commands.entity(*drone).try_insert(validated);
                    }
                }
                navigator.missing_logged = false;
                crate::log(&format!("⚙️ Drone {:?}: config replaced", drone));
            }
            DroneCommand::ForceState { drone, state } => {
                let Ok((_, _, mut machine, _)) = drones.get_mut(*drone) else {
                    crate::log_warning(&format!("ForceState: drone {:?} not found", drone));
                    continue;
                };

                if let Some(transition) = machine.force(*state, now) {
                    state_events.write(DroneStateChanged {
                        drone: *drone,
                        from: transition.from,
                        to: transition.to,
                    });
                }
            }
        }
    }
}
