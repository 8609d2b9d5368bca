//! The string-art globe: a deterministic point cloud on a sphere, random
//! chords between nearby points, and the staged lifecycle that carries the
//! weave from scattered spawn positions to its settled shape.

use glam::{EulerRot, Mat4, Vec3};
use rand::Rng;

use crate::formation::Formation;
use crate::sphere::sphere_points;

/// Chords longer than this multiple of the radius are rejected, keeping the
/// weave local instead of spanning the whole globe.
const CHORD_LIMIT: f32 = 1.5;
/// Spawn positions are drawn component-wise from [-5, 5].
const SPAWN_EXTENT: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobePhase {
    Uninitialized,
    PointsGenerated,
    LinesBuilt,
    Forming,
    Settled,
}

/// Glow twin of a string line: same geometry, softer material. Its displayed
/// endpoints are mirrored from the owner on every progress update.
#[derive(Debug, Clone, Copy)]
pub struct GlowLine {
    pub current: [Vec3; 2],
}

/// One renderable chord. `current` always equals the per-endpoint lerp of
/// `initial` toward `target` at the stored progress.
#[derive(Debug, Clone, Copy)]
pub struct StringLine {
    pub initial: [Vec3; 2],
    pub target: [Vec3; 2],
    pub current: [Vec3; 2],
    /// Eased display progress in [0, 1].
    pub progress: f32,
    /// Fixed random gradient position in [0, 1]; the display color blends
    /// toward purple by `color_mix * progress`.
    pub color_mix: f32,
    pub glow: GlowLine,
}

impl StringLine {
    pub(crate) fn new(initial: [Vec3; 2], target: [Vec3; 2], color_mix: f32) -> Self {
        Self {
            initial,
            target,
            current: initial,
            progress: 0.0,
            color_mix,
            glow: GlowLine { current: initial },
        }
    }

    /// Re-derive both displayed endpoints for `progress` and mirror them into
    /// the glow twin.
    pub fn apply_progress(&mut self, progress: f32) {
        self.progress = progress;
        self.current = [
            lerp_point(self.initial[0], self.target[0], progress),
            lerp_point(self.initial[1], self.target[1], progress),
        ];
        self.glow.current = self.current;
    }
}

/// Weighted blend rather than `from + (to - from) * t`: exact at both ends,
/// so a finished line sits bit-for-bit on its sphere target.
fn lerp_point(from: Vec3, to: Vec3, progress: f32) -> Vec3 {
    from * (1.0 - progress) + to * progress
}

pub struct Globe {
    phase: GlobePhase,
    radius: f32,
    points: Vec<Vec3>,
    lines: Vec<StringLine>,
    formation: Formation,
    rotation_x: f32,
    rotation_y: f32,
}

impl Globe {
    pub fn new() -> Self {
        Self {
            phase: GlobePhase::Uninitialized,
            radius: 0.0,
            points: Vec::new(),
            lines: Vec::new(),
            formation: Formation::new(1.0, 0.0),
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }

    /// Stage 1: lay out the deterministic point cloud.
    pub fn generate_points(&mut self, count: usize, radius: f32) {
        self.radius = radius;
        self.points = sphere_points(count, radius);
        self.phase = GlobePhase::PointsGenerated;
    }

    /// Stage 2: run exactly `attempts` chord draws. Identical indices and
    /// chords beyond the distance limit are skipped without being retried,
    /// so the accepted count may be anything from 0 to `attempts`. Every
    /// sphere point gets one spawn position; chords sharing a point share it.
    pub fn build_lines(&mut self, attempts: usize, rng: &mut impl Rng) {
        let spawns: Vec<Vec3> = self
            .points
            .iter()
            .map(|_| {
                Vec3::new(
                    (rng.r#gen::<f32>() - 0.5) * SPAWN_EXTENT,
                    (rng.r#gen::<f32>() - 0.5) * SPAWN_EXTENT,
                    (rng.r#gen::<f32>() - 0.5) * SPAWN_EXTENT,
                )
            })
            .collect();

        let mut lines = Vec::new();
        for _ in 0..attempts {
            let a = rng.gen_range(0..self.points.len());
            let b = rng.gen_range(0..self.points.len());
            if a == b {
                continue;
            }
            if self.points[a].distance(self.points[b]) > self.radius * CHORD_LIMIT {
                continue;
            }
            lines.push(StringLine::new(
                [spawns[a], spawns[b]],
                [self.points[a], self.points[b]],
                rng.r#gen(),
            ));
        }
        self.lines = lines;
        self.phase = GlobePhase::LinesBuilt;
    }

    /// Stage 3: arm the formation transition. Runs once; it is not
    /// cancellable and always plays to completion.
    pub fn begin_formation(&mut self, formation: Formation) {
        self.formation = formation;
        self.phase = GlobePhase::Forming;
    }

    /// Per-frame update while forming. Settled is terminal: afterwards only
    /// whole-globe rotation still applies.
    pub fn advance(&mut self, now: f32) {
        if self.phase != GlobePhase::Forming {
            return;
        }
        if self.formation.advance(&mut self.lines, now) {
            self.phase = GlobePhase::Settled;
            log::debug!("globe settled after {now:.2}s ({} lines)", self.lines.len());
        }
    }

    /// Accumulate one frame of rotation, radians around each axis.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.rotation_x += delta_x;
        self.rotation_y += delta_y;
    }

    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation_x, self.rotation_y, 0.0)
    }

    pub fn phase(&self) -> GlobePhase {
        self.phase
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn lines(&self) -> &[StringLine] {
        &self.lines
    }

    pub fn formation_complete(&self) -> bool {
        self.formation.is_complete()
    }
}

impl Default for Globe {
    fn default() -> Self {
        Self::new()
    }
}
