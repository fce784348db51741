//! Merge sparks: short bursts of coloured dots at every fusion.
//!
//! ## Design
//!
//! Sparks are lightweight ECS entities with a [`Spark`] component.  Three
//! systems handle them:
//!
//! | System                     | Schedule   | Purpose                                      |
//! |----------------------------|------------|----------------------------------------------|
//! | `spawn_merge_sparks_system`| PostUpdate | Turn each [`ItemsMerged`] into a burst       |
//! | `attach_spark_mesh_system` | Update     | Attach `Mesh2d` to freshly-spawned sparks    |
//! | `spark_update_system`      | Update     | Move, pull down, fade and despawn sparks     |
//!
//! Bursts are built by the pure [`merge_burst`] so counts and ranges can be
//! tested without a world.  A single shared unit-circle [`SparkMesh`] is scaled
//! per spark; each spark owns its [`ColorMaterial`] so its alpha can follow
//! its life.

use crate::catalog::ItemCatalog;
use crate::config::GameConfig;
use crate::merge::{merge_items_system, ItemsMerged};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;

/// Shared unit circle used by all sparks (created once at startup).
#[derive(Resource)]
pub struct SparkMesh(pub Handle<Mesh>);

/// One merge spark.
///
/// `material` is filled in by `attach_spark_mesh_system` one frame after the
/// spark is spawned.
#[derive(Component, Debug, Clone)]
pub struct Spark {
    /// World-space velocity (units/s).
    pub velocity: Vec2,
    /// Remaining life in `[0, 1]`; also the drawn alpha.
    pub life: f32,
    /// Diameter in world units.
    pub size: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub material: Option<Handle<ColorMaterial>>,
}

impl Spark {
    /// Integrate one step.  Returns `false` once the spark has burnt out.
    pub fn advance(&mut self, position: &mut Vec2, dt: f32, gravity: f32, decay_per_sec: f32) -> bool {
        *position += self.velocity * dt;
        self.velocity.y -= gravity * dt;
        self.life -= decay_per_sec * dt;
        self.life > 0.0
    }
}

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, init_spark_mesh)
            .add_systems(
                Update,
                (attach_spark_mesh_system, spark_update_system).chain(),
            )
            .add_systems(PostUpdate, spawn_merge_sparks_system.after(merge_items_system));
    }
}

fn init_spark_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(0.5, 8));
    commands.insert_resource(SparkMesh(handle));
}

/// Build the sparks for one fusion at `center` in the fused tier's colour.
///
/// Spark count is drawn from `spark_count_min..=spark_count_max`, each spark
/// flies off at a random angle and speed, and all start at full life.
pub fn merge_burst<R: Rng + ?Sized>(
    rng: &mut R,
    color: Color,
    config: &GameConfig,
) -> Vec<Spark> {
    let count = rng.gen_range(config.spark_count_min..=config.spark_count_max);
    let rgb = Srgba::from(color);
    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = rng.gen_range(0.0..=config.spark_speed_max);
            Spark {
                velocity: Vec2::from_angle(angle) * speed,
                life: 1.0,
                size: rng.gen_range(config.spark_size_min..=config.spark_size_max),
                r: rgb.red,
                g: rgb.green,
                b: rgb.blue,
                material: None,
            }
        })
        .collect()
}

/// Spawn a burst for every fusion written this frame.
pub fn spawn_merge_sparks_system(
    mut commands: Commands,
    mut merged: MessageReader<ItemsMerged>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
) {
    let mut rng = rand::thread_rng();
    for event in merged.read() {
        let Some(tier) = catalog.get(event.tier) else {
            continue;
        };
        for spark in merge_burst(&mut rng, tier.color, &config) {
            let size = spark.size;
            commands.spawn((
                spark,
                Transform::from_translation(event.position.extend(5.0))
                    .with_scale(Vec3::new(size, size, 1.0)),
                Visibility::default(),
            ));
        }
    }
}

/// Attach `Mesh2d` + `MeshMaterial2d` to every newly-spawned [`Spark`].
pub fn attach_spark_mesh_system(
    mut commands: Commands,
    spark_mesh: Res<SparkMesh>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Spark), Added<Spark>>,
) {
    for (entity, mut spark) in query.iter_mut() {
        let handle = materials.add(ColorMaterial::from_color(Color::srgba(
            spark.r, spark.g, spark.b, spark.life,
        )));
        spark.material = Some(handle.clone());
        commands
            .entity(entity)
            .insert((Mesh2d(spark_mesh.0.clone()), MeshMaterial2d(handle)));
    }
}

/// Advance all sparks and despawn the ones whose life ran out.
pub fn spark_update_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(Entity, &mut Transform, &mut Spark)>,
) {
    let dt = time.delta_secs();

    for (entity, mut transform, mut spark) in query.iter_mut() {
        let mut position = transform.translation.truncate();
        let alive = spark.advance(&mut position, dt, config.spark_gravity, config.spark_decay_per_sec);
        if !alive {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation.x = position.x;
        transform.translation.y = position.y;

        if let Some(ref handle) = spark.material {
            if let Some(mat) = materials.get_mut(handle) {
                mat.color = Color::srgba(spark.r, spark.g, spark.b, spark.life);
            }
        }
    }
}

/// Triangle-fan circle mesh; shared by sparks and the fallback item faces.
pub(crate) fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let (sin, cos) = (std::f32::consts::TAU * i as f32 / n as f32).sin_cos();
        positions.push([radius * cos, radius * sin, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([0.5 + 0.5 * cos, 0.5 + 0.5 * sin]);
    }

    let rim = n as u32;
    let indices: Vec<u32> = (0..rim).flat_map(|i| [0, i + 1, (i + 1) % rim + 1]).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
