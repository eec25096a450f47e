//! Drone Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: follow-and-avoid навигация дрона.
//!
//! Слои:
//! - drone: конфиг, state machine, steering, системы
//! - physics: collision layers, probes, headless actuator (+ Rapier компоненты)
//! - feedback: state → цвета/подсветка (sink)
//! - logger: глобальный pluggable logger

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod drone;
pub mod feedback;
pub mod logger;
pub mod physics;

// Re-export базовых типов для удобства
pub use drone::{
    spawn_drone, update_drone_events, ConfigError, Drone, DroneCommand, DroneConfig, DroneImpulse, DroneMotion,
    DroneNavigator, DronePlugin, DroneState, DroneStateChanged, DroneStateMachine, FollowTarget, ObstacleSignal,
    PulseRequested,
};
pub use feedback::{DroneFeedback, FeedbackPalette};
pub use logger::*;
pub use physics::{CollisionProbe, NoObstacles, Obstacle, ObstacleField, ProbeHit};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(DronePlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Прогоняет `ticks` шагов FixedUpdate напрямую (без wall-clock времени)
///
/// Каждый шаг сдвигает `Time<Fixed>` ровно на timestep: тесты не зависят
/// от скорости машины.
///
/// `First` не запускается, поэтому буферы событий копят всю историю прогона
/// (тесты читают её целиком). Для долгих прогонов: `update_drone_events`.
pub fn run_fixed_ticks(app: &mut App, ticks: usize) {
    let world = app.world_mut();
    world.flush();

    for _ in 0..ticks {
        let timestep = world.resource::<Time<Fixed>>().timestep();
        world.resource_mut::<Time<Fixed>>().advance_by(timestep);
        world.run_schedule(FixedUpdate);
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
