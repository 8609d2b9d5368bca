//! Ambient dressing around the globe: a drifting particle shell and pulsing
//! glow markers on the surface. Both sets are built once and only ever
//! mutated in place; nothing is added or removed after construction.

use glam::{EulerRot, Mat4, Vec3};
use rand::Rng;

use crate::palette::{self, PINK, PURPLE};

/// Shell depth above the globe surface that particles occupy.
const SHELL_DEPTH: f32 = 2.0;
/// Whole-field spin per frame, radians.
const FIELD_SPIN_Y: f32 = 0.0003;
const FIELD_SPIN_X: f32 = 0.0002;
/// Per-frame vertical drift amplitude.
const DRIFT_AMPLITUDE: f32 = 0.0003;

/// Glow markers sit just below the surface so the strings overlap them.
const MARKER_SURFACE_FACTOR: f32 = 0.9;
/// Base world radius of one marker before its pulse scale applies.
pub const MARKER_RADIUS: f32 = 0.03;

/// Uniform point on a sphere of the given radius. `acos(2u - 1)` keeps the
/// polar angle area-correct.
fn random_surface_point(radius: f32, rng: &mut impl Rng) -> Vec3 {
    let theta = rng.r#gen::<f32>() * std::f32::consts::TAU;
    let phi = (rng.r#gen::<f32>() * 2.0 - 1.0).acos();
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

pub struct Particle {
    /// Mutated by the vertical drift; the field rotation is applied
    /// separately at render time.
    pub position: Vec3,
    pub color: [f32; 3],
    /// World radius, pseudo-random per particle.
    pub size: f32,
}

pub struct ParticleField {
    particles: Vec<Particle>,
    rotation_x: f32,
    rotation_y: f32,
}

impl ParticleField {
    pub fn new(count: usize, globe_radius: f32, rng: &mut impl Rng) -> Self {
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let radius = globe_radius + rng.r#gen::<f32>() * SHELL_DEPTH;
            particles.push(Particle {
                position: random_surface_point(radius, rng),
                color: palette::mix(PINK, PURPLE, rng.r#gen()),
                size: 0.01 + rng.r#gen::<f32>() * 0.03,
            });
        }
        Self {
            particles,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    /// One frame of motion: slow field spin plus per-particle vertical
    /// drift. The drift phase is offset by the y slot each particle occupies
    /// in a packed xyz attribute stream (3k + 1), so neighbours never bob in
    /// lockstep even though the motion is a pure function of time.
    pub fn tick(&mut self, elapsed: f32) {
        self.rotation_y += FIELD_SPIN_Y;
        self.rotation_x += FIELD_SPIN_X;
        for (index, particle) in self.particles.iter_mut().enumerate() {
            let phase = (index * 3 + 1) as f32;
            particle.position.y += (elapsed + phase).sin() * DRIFT_AMPLITUDE;
        }
    }

    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation_x, self.rotation_y, 0.0)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    pub scale: f32,
    pub opacity: f32,
}

pub struct GlowPoint {
    pub position: Vec3,
    pub color: [f32; 3],
    pub base_scale: f32,
    /// Pulse speed in cycles-ish per millisecond of elapsed time.
    pub speed: f32,
    pub base_opacity: f32,
}

impl GlowPoint {
    /// Scale and opacity at `elapsed` seconds. Each marker pulses on its own
    /// sinusoid seeded by its speed and index.
    pub fn pulse(&self, index: usize, elapsed: f32) -> Pulse {
        let t = elapsed * 1000.0 * self.speed + index as f32;
        Pulse {
            scale: self.base_scale + t.sin() * 0.3,
            opacity: self.base_opacity + t.sin() * 0.2,
        }
    }
}

pub struct GlowMarkers {
    points: Vec<GlowPoint>,
}

impl GlowMarkers {
    pub fn new(count: usize, globe_radius: f32, rng: &mut impl Rng) -> Self {
        let radius = globe_radius * MARKER_SURFACE_FACTOR;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(GlowPoint {
                position: random_surface_point(radius, rng),
                color: palette::mix(PINK, PURPLE, rng.r#gen()),
                base_scale: 0.5 + rng.r#gen::<f32>() * 0.5,
                speed: 0.01 + rng.r#gen::<f32>() * 0.02,
                base_opacity: 0.7 + rng.r#gen::<f32>() * 0.3,
            });
        }
        Self { points }
    }

    pub fn points(&self) -> &[GlowPoint] {
        &self.points
    }
}
