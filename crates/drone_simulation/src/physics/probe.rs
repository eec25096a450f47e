//! Collision probes: sphere-cast запросы к окружению
//!
//! Навигация дрона не знает про физический движок: она видит только
//! `CollisionProbe::probe(origin, radius, direction, max_distance, mask)`.
//!
//! Реализации:
//! - `ObstacleField`: headless окружение (сферы + AABB), аналитический swept-sphere
//! - `NoObstacles`: окружение отсутствует → всегда "no hit"
//!
//! TODO: RapierProbe поверх `ReadRapierContext::cast_shape`, когда дрон переедет
//! в полный Rapier pipeline (сейчас Rapier только для Velocity/Collider компонентов).

use bevy::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::layers::COLLISION_LAYER_ENVIRONMENT;

/// Идентификатор препятствия (индекс в ObstacleField)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct ObstacleId(pub u32);

/// Результат probe: дистанция до первого контакта + кто
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ProbeHit {
    pub distance: f32,
    pub obstacle: ObstacleId,
}

/// Collision query capability (pure, без мутации мира)
pub trait CollisionProbe {
    /// Sphere-cast радиуса `radius` из `origin` вдоль `direction` до `max_distance`.
    ///
    /// `direction` может быть не нормализован; нулевой вектор → None.
    fn probe(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<ProbeHit>;
}

/// Пустое окружение: ничего не блокирует
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl CollisionProbe for NoObstacles {
    fn probe(&self, _: Vec3, _: f32, _: Vec3, _: f32, _: u32) -> Option<ProbeHit> {
        None
    }
}

/// Форма препятствия
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ObstacleShape {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box
    Cuboid { min: Vec3, max: Vec3 },
}

/// Статическое препятствие на слое `layer`
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    pub layer: u32,
}

impl Obstacle {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self {
            shape: ObstacleShape::Sphere { center, radius },
            layer: COLLISION_LAYER_ENVIRONMENT,
        }
    }

    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            shape: ObstacleShape::Cuboid {
                min: center - half,
                max: center + half,
            },
            layer: COLLISION_LAYER_ENVIRONMENT,
        }
    }

    pub fn on_layer(mut self, layer: u32) -> Self {
        self.layer = layer;
        self
    }

    /// Дистанция вдоль `dir` (unit) до контакта сферы радиуса `radius`
    fn sweep(&self, origin: Vec3, radius: f32, dir: Vec3, max_distance: f32) -> Option<f32> {
        match self.shape {
            ObstacleShape::Sphere { center, radius: obstacle_radius } => {
                sweep_sphere(origin, dir, center, obstacle_radius + radius, max_distance)
            }
            ObstacleShape::Cuboid { min, max } => {
                // Minkowski sum аппроксимируем расширенным AABB (консервативно на углах)
                let inflate = Vec3::splat(radius.max(0.0));
                sweep_aabb(origin, dir, min - inflate, max + inflate, max_distance)
            }
        }
    }
}

/// Ray vs sphere (уже расширенной на радиус probe). Старт внутри → 0.
fn sweep_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32, max_distance: f32) -> Option<f32> {
    let offset = origin - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = offset.dot(dir);
    if b >= 0.0 {
        // Смотрим от сферы
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    (t <= max_distance).then_some(t.max(0.0))
}

/// Ray vs AABB (slab test). Старт внутри → 0.
fn sweep_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3, max_distance: f32) -> Option<f32> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (lo, hi) = (min[axis], max[axis]);

        if d.abs() < 1e-6 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (t1, t2) = ((lo - o) * inv, (hi - o) * inv);
        let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

/// Headless окружение: набор статических препятствий
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    /// Случайное поле сфер (детерминировано seed'ом)
    pub fn scattered(seed: u64, count: usize, extent: f32, clear_radius: f32) -> Self {
        Self::from_rng(&mut ChaCha8Rng::seed_from_u64(seed), count, extent, clear_radius)
    }

    /// Случайное поле сфер из переданного RNG (обычно `DeterministicRng`)
    ///
    /// Центры в квадрате `[-extent, extent]` по XZ, высота 0.5..3м, радиус 0.5..1.5м.
    /// Зона `clear_radius` вокруг начала координат остаётся пустой (spawn).
    pub fn from_rng<R: Rng>(rng: &mut R, count: usize, extent: f32, clear_radius: f32) -> Self {
        let mut obstacles = Vec::with_capacity(count);

        while obstacles.len() < count {
            let center = Vec3::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(0.5..3.0),
                rng.gen_range(-extent..extent),
            );
            let radius = rng.gen_range(0.5..1.5);

            if Vec2::new(center.x, center.z).length() < clear_radius + radius {
                continue;
            }

            obstacles.push(Obstacle::sphere(center, radius));
        }

        Self { obstacles }
    }

    pub fn push(&mut self, obstacle: Obstacle) -> ObstacleId {
        self.obstacles.push(obstacle);
        ObstacleId(self.obstacles.len() as u32 - 1)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl CollisionProbe for ObstacleField {
    fn probe(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layer_mask: u32,
    ) -> Option<ProbeHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        self.obstacles
            .iter()
            .enumerate()
            .filter(|(_, obstacle)| obstacle.layer & layer_mask != 0)
            .filter_map(|(index, obstacle)| {
                obstacle
                    .sweep(origin, radius, dir, max_distance)
                    .map(|distance| ProbeHit {
                        distance,
                        obstacle: ObstacleId(index as u32),
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Optional resource → probe (отсутствие окружения = свободный путь)
pub fn probe_or_clear(field: Option<&ObstacleField>) -> &dyn CollisionProbe {
    match field {
        Some(field) => field,
        None => &NoObstacles,
    }
}
