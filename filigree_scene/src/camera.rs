//! Perspective camera with pointer parallax. The camera drifts toward a
//! target offset derived from the pointer, one damped step per frame, and
//! always re-aims at the scene origin.

use glam::{Mat4, Vec3};

/// Pointer offset from the window centre, physical pixels. Updated by the
/// windowing layer on every cursor move; read, never owned, by the tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerOffset {
    pub x: f32,
    pub y: f32,
}

/// Pixels of pointer offset to world units of camera travel.
const PARALLAX_SCALE: f32 = 2.0e-4;
/// Fraction of the remaining distance covered per frame.
const EASE_FACTOR: f32 = 0.05;

const FOV_DEGREES: f32 = 50.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;
const EYE_DISTANCE: f32 = 6.0;

pub struct ParallaxCamera {
    position: Vec3,
    aspect: f32,
}

impl ParallaxCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, EYE_DISTANCE),
            aspect,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Applied on viewport resize, before the next frame renders.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// One damped step toward the pointer-derived target. Repeated calls
    /// with a steady pointer converge on the target without overshoot.
    pub fn ease_toward(&mut self, pointer: PointerOffset) {
        let target_x = pointer.x * PARALLAX_SCALE;
        let target_y = -pointer.y * PARALLAX_SCALE;
        self.position.x += (target_x - self.position.x) * EASE_FACTOR;
        self.position.y += (target_y - self.position.y) * EASE_FACTOR;
    }

    /// View-projection for the current eye position, aimed at the origin.
    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        let projection =
            Mat4::perspective_rh(FOV_DEGREES.to_radians(), self.aspect, NEAR_PLANE, FAR_PLANE);
        projection * view
    }

    pub fn sprite_projector(&self) -> SpriteProjector {
        SpriteProjector {
            view_projection: self.view_projection(),
            focal: 1.0 / (FOV_DEGREES.to_radians() * 0.5).tan(),
            aspect: self.aspect,
        }
    }
}

/// Snapshot of the camera transform for projecting sprite centres into
/// normalized device coordinates, with perspective-correct half-extents.
pub struct SpriteProjector {
    view_projection: Mat4,
    focal: f32,
    aspect: f32,
}

/// A sprite centre in NDC plus its half-extents per axis.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedSprite {
    pub center: [f32; 2],
    pub extent: [f32; 2],
}

impl SpriteProjector {
    /// `None` when the position is behind the eye or projects outside finite
    /// range; such sprites are simply skipped for the frame.
    pub fn project(&self, position: Vec3, world_radius: f32) -> Option<ProjectedSprite> {
        let clip = self.view_projection * position.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.x.is_finite() || !ndc.y.is_finite() {
            return None;
        }
        let extent_y = world_radius * self.focal / clip.w;
        Some(ProjectedSprite {
            center: [ndc.x, ndc.y],
            extent: [extent_y / self.aspect, extent_y],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_the_aspect_ratio() {
        let mut camera = ParallaxCamera::new(1920.0 / 1080.0);
        camera.set_aspect(800.0 / 600.0);
        assert_eq!(camera.aspect(), 800.0 / 600.0);
    }

    #[test]
    fn degenerate_aspects_are_ignored() {
        let mut camera = ParallaxCamera::new(16.0 / 9.0);
        camera.set_aspect(0.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect(), 16.0 / 9.0);
    }

    #[test]
    fn easing_converges_on_the_pointer_target() {
        let mut camera = ParallaxCamera::new(1.0);
        let pointer = PointerOffset { x: 500.0, y: -300.0 };
        for _ in 0..500 {
            camera.ease_toward(pointer);
        }
        let position = camera.position();
        assert!((position.x - 500.0 * PARALLAX_SCALE).abs() < 1e-5);
        assert!((position.y - 300.0 * PARALLAX_SCALE).abs() < 1e-5);
        assert_eq!(position.z, EYE_DISTANCE);
    }

    #[test]
    fn each_easing_step_shrinks_the_remaining_distance() {
        let mut camera = ParallaxCamera::new(1.0);
        let pointer = PointerOffset { x: 1000.0, y: 0.0 };
        let target = 1000.0 * PARALLAX_SCALE;
        let mut remaining = (target - camera.position().x).abs();
        for _ in 0..20 {
            camera.ease_toward(pointer);
            let next = (target - camera.position().x).abs();
            assert!(next < remaining);
            remaining = next;
        }
    }

    #[test]
    fn origin_projects_to_the_screen_centre() {
        let camera = ParallaxCamera::new(16.0 / 9.0);
        let sprite = camera
            .sprite_projector()
            .project(Vec3::ZERO, 0.1)
            .expect("origin is in front of the eye");
        assert!(sprite.center[0].abs() < 1e-6);
        assert!(sprite.center[1].abs() < 1e-6);
        assert!(sprite.extent[1] > 0.0);
        // Horizontal extent is compressed by the aspect ratio.
        assert!(sprite.extent[0] < sprite.extent[1]);
    }

    #[test]
    fn points_behind_the_eye_are_culled() {
        let camera = ParallaxCamera::new(1.0);
        let projector = camera.sprite_projector();
        assert!(projector.project(Vec3::new(0.0, 0.0, 20.0), 0.1).is_none());
    }

    #[test]
    fn nearer_sprites_project_larger() {
        let camera = ParallaxCamera::new(1.0);
        let projector = camera.sprite_projector();
        let near = projector.project(Vec3::new(0.0, 0.0, 2.0), 0.1).unwrap();
        let far = projector.project(Vec3::new(0.0, 0.0, -4.0), 0.1).unwrap();
        assert!(near.extent[1] > far.extent[1]);
    }
}
