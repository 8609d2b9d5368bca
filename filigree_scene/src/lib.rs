//! Simulation state for the animated string-art globe: deterministic sphere
//! point generation, random chord selection, a staggered formation
//! transition, ambient particles and glow markers, and a parallax camera.
//! One [`Scene`] owns all of it; [`Scene::tick`] is the single per-frame
//! mutation point and returns the geometry a renderer needs. Nothing in this
//! crate touches a window or a GPU.

pub mod ambient;
pub mod camera;
pub mod config;
pub mod formation;
pub mod globe;
pub mod palette;
pub mod sphere;

use glam::Mat4;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::ambient::{GlowMarkers, MARKER_RADIUS, ParticleField};
use crate::camera::{ParallaxCamera, PointerOffset};
use crate::config::{ConfigError, SceneConfig};
use crate::formation::Formation;
use crate::globe::{Globe, GlobePhase};
use crate::palette::{PINK, PURPLE, mix};

/// Idle spin per frame, radians.
const IDLE_SPIN_Y: f32 = 0.002;
const IDLE_SPIN_X: f32 = 0.001;
/// Pointer pixels to parallax rotation, damped so the pull stays subtle.
const POINTER_SPIN_SCALE: f32 = 2.0e-4;
const POINTER_SPIN_DAMPING: f32 = 0.1;

const MAIN_LINE_ALPHA: f32 = 0.6;
const GLOW_LINE_ALPHA: f32 = 0.3;
const PARTICLE_ALPHA: f32 = 0.7;

/// One line endpoint ready for a vertex buffer, in globe-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePoint {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// One screen-space sprite: centre and half-extents in NDC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteInstance {
    pub center: [f32; 2],
    pub extent: [f32; 2],
    pub color: [f32; 3],
    pub alpha: f32,
}

/// Everything a renderer needs for one frame. Line positions are in
/// globe-local space with `globe_model` applied by the line shader; sprites
/// are already projected.
pub struct SceneFrame {
    pub view_projection: Mat4,
    pub globe_model: Mat4,
    pub glow_lines: Vec<LinePoint>,
    pub main_lines: Vec<LinePoint>,
    pub particles: Vec<SpriteInstance>,
    pub markers: Vec<SpriteInstance>,
}

/// The aggregate that owns every animated collection for one globe
/// instance. Exactly one per process run; torn down implicitly on exit.
pub struct Scene {
    globe: Globe,
    particles: ParticleField,
    markers: GlowMarkers,
    camera: ParallaxCamera,
}

impl Scene {
    /// Build the full scene graph: points, chords, ambient sets, camera.
    /// The formation is armed here and starts counting from elapsed time
    /// zero; it runs to completion and is not cancellable.
    pub fn new(config: &SceneConfig, aspect: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut globe = Globe::new();
        globe.generate_points(config.point_count, config.radius);
        globe.build_lines(config.line_attempts, &mut rng);
        globe.begin_formation(Formation::new(
            config.formation_duration,
            config.formation_stagger,
        ));

        let particles = ParticleField::new(config.particle_count, config.radius, &mut rng);
        let markers = GlowMarkers::new(config.glow_count, config.radius, &mut rng);

        Ok(Self {
            globe,
            particles,
            markers,
            camera: ParallaxCamera::new(aspect),
        })
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.camera.set_aspect(aspect);
    }

    pub fn phase(&self) -> GlobePhase {
        self.globe.phase()
    }

    pub fn formation_complete(&self) -> bool {
        self.globe.formation_complete()
    }

    pub fn point_count(&self) -> usize {
        self.globe.points().len()
    }

    pub fn line_count(&self) -> usize {
        self.globe.lines().len()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.particles().len()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.points().len()
    }

    /// Advance every animated collection one frame. `elapsed` is seconds
    /// since the scene was built; `pointer` is the current offset from the
    /// window centre. Order matches the render loop contract: globe
    /// rotation, formation, particles, glow pulse, camera ease.
    pub fn tick(&mut self, elapsed: f32, pointer: PointerOffset) -> SceneFrame {
        self.globe.rotate(
            IDLE_SPIN_X + pointer.y * POINTER_SPIN_SCALE * POINTER_SPIN_DAMPING,
            IDLE_SPIN_Y + pointer.x * POINTER_SPIN_SCALE * POINTER_SPIN_DAMPING,
        );

        let was_complete = self.globe.formation_complete();
        self.globe.advance(elapsed);
        if !was_complete && self.globe.formation_complete() {
            log::info!(
                "formation complete after {elapsed:.2}s ({} lines settled)",
                self.globe.lines().len()
            );
        }

        self.particles.tick(elapsed);
        self.camera.ease_toward(pointer);
        self.assemble_frame(elapsed)
    }

    fn assemble_frame(&self, elapsed: f32) -> SceneFrame {
        let lines = self.globe.lines();
        let mut glow_lines = Vec::with_capacity(lines.len() * 2);
        let mut main_lines = Vec::with_capacity(lines.len() * 2);
        for line in lines {
            let rgb = mix(PINK, PURPLE, line.color_mix * line.progress);
            for end in 0..2 {
                glow_lines.push(LinePoint {
                    position: line.glow.current[end].to_array(),
                    color: [PURPLE[0], PURPLE[1], PURPLE[2], GLOW_LINE_ALPHA],
                });
                main_lines.push(LinePoint {
                    position: line.current[end].to_array(),
                    color: [rgb[0], rgb[1], rgb[2], MAIN_LINE_ALPHA],
                });
            }
        }

        let projector = self.camera.sprite_projector();
        let field_rotation = self.particles.rotation_matrix();
        let mut particles = Vec::with_capacity(self.particles.particles().len());
        for particle in self.particles.particles() {
            let world = field_rotation.transform_point3(particle.position);
            if let Some(projected) = projector.project(world, particle.size) {
                particles.push(SpriteInstance {
                    center: projected.center,
                    extent: projected.extent,
                    color: particle.color,
                    alpha: PARTICLE_ALPHA,
                });
            }
        }

        let mut markers = Vec::with_capacity(self.markers.points().len());
        for (index, point) in self.markers.points().iter().enumerate() {
            let pulse = point.pulse(index, elapsed);
            if let Some(projected) = projector.project(point.position, MARKER_RADIUS * pulse.scale)
            {
                markers.push(SpriteInstance {
                    center: projected.center,
                    extent: projected.extent,
                    color: point.color,
                    alpha: pulse.opacity.clamp(0.0, 1.0),
                });
            }
        }

        SceneFrame {
            view_projection: self.camera.view_projection(),
            globe_model: self.globe.rotation_matrix(),
            glow_lines,
            main_lines,
            particles,
            markers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config() -> SceneConfig {
        SceneConfig {
            seed: Some(99),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn construction_validates_the_config() {
        let bad = SceneConfig {
            point_count: 1,
            ..SceneConfig::default()
        };
        assert!(Scene::new(&bad, 1.0).is_err());
    }

    #[test]
    fn fresh_scene_is_forming_and_settles() {
        let mut scene = Scene::new(&seeded_config(), 16.0 / 9.0).expect("valid config");
        assert_eq!(scene.phase(), GlobePhase::Forming);
        assert!(!scene.formation_complete());

        // Default timing: 3s duration + up to 200 * 0.01s stagger, so by 6s
        // every line has settled.
        scene.tick(6.0, PointerOffset::default());
        assert_eq!(scene.phase(), GlobePhase::Settled);
        assert!(scene.formation_complete());
    }

    #[test]
    fn frame_geometry_is_twinned_and_paired() {
        let mut scene = Scene::new(&seeded_config(), 1.0).expect("valid config");
        let frame = scene.tick(0.5, PointerOffset::default());

        assert_eq!(frame.main_lines.len(), scene.line_count() * 2);
        assert_eq!(frame.glow_lines.len(), frame.main_lines.len());
        for (glow, main) in frame.glow_lines.iter().zip(&frame.main_lines) {
            assert_eq!(glow.position, main.position);
        }
        assert!(frame.particles.len() <= scene.particle_count());
        assert!(frame.markers.len() <= scene.marker_count());
    }

    #[test]
    fn seeded_scenes_emit_identical_frames() {
        let mut first = Scene::new(&seeded_config(), 1.0).expect("valid config");
        let mut second = Scene::new(&seeded_config(), 1.0).expect("valid config");
        let frame_a = first.tick(1.0, PointerOffset { x: 40.0, y: -25.0 });
        let frame_b = second.tick(1.0, PointerOffset { x: 40.0, y: -25.0 });
        assert_eq!(frame_a.main_lines, frame_b.main_lines);
        assert_eq!(frame_a.particles, frame_b.particles);
        assert_eq!(frame_a.markers, frame_b.markers);
    }

    #[test]
    fn pointer_offset_steers_the_camera() {
        let mut scene = Scene::new(&seeded_config(), 1.0).expect("valid config");
        let steady = PointerOffset { x: 800.0, y: 0.0 };
        let mut elapsed = 0.0;
        for _ in 0..300 {
            elapsed += 1.0 / 60.0;
            scene.tick(elapsed, steady);
        }
        // The eye has drifted toward the pointer target, so the view matrix
        // differs from the centred one.
        let centred = ParallaxCamera::new(1.0).view_projection();
        assert!(scene.camera.view_projection() != centred);
    }

    #[test]
    fn settled_globe_keeps_rotating() {
        let mut scene = Scene::new(&seeded_config(), 1.0).expect("valid config");
        scene.tick(10.0, PointerOffset::default());
        assert_eq!(scene.phase(), GlobePhase::Settled);
        let before = scene.tick(10.1, PointerOffset::default()).globe_model;
        let after = scene.tick(10.2, PointerOffset::default()).globe_model;
        assert!(before != after);
    }
}
