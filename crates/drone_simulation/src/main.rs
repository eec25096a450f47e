//! Headless симуляция дрона
//!
//! Цель ходит по кругу через случайное поле препятствий, дрон сопровождает.
//! Usage: drone_simulation [config.json]

use bevy::prelude::*;
use drone_simulation::{
    create_headless_app, init_logger, log_error, log_info, run_fixed_ticks, spawn_drone, update_drone_events,
    DeterministicRng, DroneConfig, DroneStateMachine, ObstacleField, SimulationPlugin,
};

/// Цель, которая ходит по кругу (вместо игрока)
#[derive(Component)]
struct CircleWalker {
    radius: f32,
    angular_speed: f32,
}

fn walk_in_circle(mut walkers: Query<(&CircleWalker, &mut Transform)>, time: Res<Time<Fixed>>) {
    let t = time.elapsed_secs();

    for (walker, mut transform) in walkers.iter_mut() {
        let angle = t * walker.angular_speed;
        let position = Vec3::new(angle.cos() * walker.radius, 0.0, angle.sin() * walker.radius);
        // Смотрим по касательной
        let tangent = Vec3::new(-angle.sin(), 0.0, angle.cos());
        *transform = Transform::from_translation(position).looking_to(tangent, Vec3::Y);
    }
}

fn main() {
    let seed = 42;
    init_logger();
    log_info(&format!("Starting drone headless simulation (seed: {})", seed));

    let config = match std::env::args().nth(1) {
        Some(path) => DroneConfig::load(&path).unwrap_or_else(|err| {
            log_error(&format!("{} → using defaults", err));
            DroneConfig::default()
        }),
        None => DroneConfig::default(),
    };

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .add_systems(FixedUpdate, walk_in_circle.before(drone_simulation::drone::systems::activate_drones));

    let field = {
        let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
        ObstacleField::from_rng(&mut rng.rng, 40, 30.0, 3.0)
    };
    app.insert_resource(field);

    let target = app
        .world_mut()
        .spawn((
            Transform::from_xyz(12.0, 0.0, 0.0),
            CircleWalker {
                radius: 12.0,
                angular_speed: 0.15,
            },
        ))
        .id();

    let spawned = {
        let mut commands = app.world_mut().commands();
        spawn_drone(&mut commands, Vec3::new(12.0, 2.0, 6.0), config, Some(target))
    };
    let drone = match spawned {
        Ok(drone) => drone,
        Err(err) => {
            log_error(&format!("Failed to spawn drone: {}", err));
            return;
        }
    };

    // 60 секунд симуляции
    for second in 0..60 {
        run_fixed_ticks(&mut app, 60);

        let world = app.world_mut();
        update_drone_events(world);

        let Some(transform) = world.get::<Transform>(drone) else {
            break;
        };
        let position = transform.translation;
        let state = world
            .get::<DroneStateMachine>(drone)
            .map(|machine| machine.current());

        println!("t={:>2}s drone at {:.2?} state {:?}", second + 1, position, state);
    }

    println!("Simulation complete!");
}
