//! Headless fly-around.
//!
//! A camera circles a planet-sized sphere far from the universe origin while
//! the root anchor follows it. The single-precision scene positions logged
//! each second stay close to the origin even though the camera travels
//! thousands of kilometers.
//!
//! Run with `RUST_LOG=info cargo run --manifest-path app/Cargo.toml` (or `debug` to also see
//! rebasing and node activation).

use anyhow::Context;
use glam::{DMat4, DVec3, Quat, Vec3};
use hpworld::math::look_rotation_safe;
use hpworld::node::transform;
use hpworld::scene::{self, Transform};
use hpworld::{
    transform_system, DoubleBounds, FrustumCuller, GlobalTransform, HpTransform, PrecisionConfig,
    PrecisionWorld, RebaseConfig, RebasePolicy, RebaseTrigger,
};

/// Configuration for the flight.
#[derive(Debug, Clone)]
struct FlightConfig {
    /// Planet radius in meters. Default: 6 378 137.
    radius: f64,
    /// Camera altitude above the surface in meters. Default: 1000.
    altitude: f64,
    /// Angular speed in degrees per frame. Default: 0.01.
    degrees_per_frame: f64,
    /// Number of frames to simulate. Default: 3600.
    frames: u32,
    /// Frames between two log lines. Default: 60.
    log_every: u32,
    /// Rebase once the camera is this far from the anchor. Default: 2000.
    rebase_distance: f64,
    /// Number of landmarks spread along the equator. Default: 36.
    landmarks: usize,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            radius: 6_378_137.0,
            altitude: 1000.0,
            degrees_per_frame: 0.01,
            frames: 3600,
            log_every: 60,
            rebase_distance: 2000.0,
            landmarks: 36,
        }
    }
}

struct Landmark {
    entity: hecs::Entity,
    bounds: DoubleBounds,
}

/// Point on the equator at `degrees` longitude, `height` above the center.
fn equator_point(height: f64, degrees: f64) -> DVec3 {
    let (s, c) = degrees.to_radians().sin_cos();
    DVec3::new(height * c, 0.0, height * s)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = FlightConfig::default();

    let mut world = hecs::World::new();
    let precision = PrecisionWorld::new(PrecisionConfig::default());

    let origin = scene::spawn(&mut world, Transform::identity());
    precision
        .add_root(&mut world, origin, equator_point(config.radius, 0.0), Quat::IDENTITY)
        .context("failed to add the root")?;

    let camera = scene::spawn_child(&mut world, origin, Transform::identity())?;
    precision.add_transform(
        &mut world,
        camera,
        HpTransform::from_position(equator_point(config.radius + config.altitude, 0.0)),
    )?;

    let mut landmarks = Vec::with_capacity(config.landmarks);
    for i in 0..config.landmarks {
        let degrees = i as f64 * 360.0 / config.landmarks as f64;
        let position = equator_point(config.radius, degrees);
        let entity = scene::spawn_child(&mut world, origin, Transform::identity())?;
        precision.add_transform(&mut world, entity, HpTransform::from_position(position))?;
        landmarks.push(Landmark {
            entity,
            bounds: DoubleBounds::new(position, DVec3::splat(200.0)),
        });
    }

    let mut rebase = RebasePolicy::new(
        RebaseConfig {
            trigger: RebaseTrigger::Distance(config.rebase_distance),
        },
        origin,
        camera,
    );
    let projection = DMat4::perspective_rh(60f64.to_radians(), 16.0 / 9.0, 1.0, 1.0e6);
    let mut culler = FrustumCuller::new(projection);
    let mut rebases = 0u32;

    log::info!(
        "flying {} frames at {} m above a {} m planet",
        config.frames,
        config.altitude,
        config.radius
    );

    for frame in 0..config.frames {
        let degrees = frame as f64 * config.degrees_per_frame;
        let position = equator_point(config.radius + config.altitude, degrees);
        let up = position.normalize();
        let forward = up.cross(DVec3::Y).normalize();

        transform::set_universe_position(&world, camera, position)?;
        transform::set_universe_rotation(&world, camera, look_rotation_safe(forward.as_vec3(), up.as_vec3()))?;

        if rebase.update(&world)? {
            rebases += 1;
        }
        precision.update(&mut world);
        transform_system(&mut world);

        if frame % config.log_every == 0 {
            let view = DMat4::look_at_rh(position, position + forward, up);
            culler.update(projection * view);
            let visible = culler.filter_visible(&landmarks, |l| &l.bounds);

            let camera_world = world
                .get::<&GlobalTransform>(camera)
                .map(|g| g.0.transform_point3(Vec3::ZERO))
                .context("camera has no global transform")?;
            let nearest = visible
                .first()
                .map(|&i| landmarks[i].entity)
                .and_then(|e| scene::world_matrix(&world, e).ok())
                .map(|m| m.transform_point3(Vec3::ZERO));

            log::info!(
                "frame {:>5} lon {:>7.3} deg | camera scene pos {:?} | {} landmark(s) visible, first at {:?} | {} rebase(s)",
                frame,
                degrees,
                camera_world,
                visible.len(),
                nearest,
                rebases
            );
        }
    }

    log::info!("done after {} rebases", rebases);
    Ok(())
}
