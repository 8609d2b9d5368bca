//! CPU-side assembly of one frame's GPU uploads. Pure and allocation-only,
//! so the buffer layout rules live under test without a device.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use filigree_scene::SceneFrame;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct SpriteInstanceRaw {
    pub center: [f32; 2],
    pub extent: [f32; 2],
    pub color: [f32; 3],
    pub alpha: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct GlobeUniforms {
    pub transform: [[f32; 4]; 4],
}

pub struct FrameBuffers {
    pub uniforms: GlobeUniforms,
    /// Glow vertices first, then main vertices, one shared buffer.
    pub line_vertices: Vec<LineVertex>,
    pub glow_range: Range<u32>,
    pub main_range: Range<u32>,
    /// Particles first, then markers, one shared instance buffer.
    pub sprite_instances: Vec<SpriteInstanceRaw>,
    pub particle_range: Range<u32>,
    pub marker_range: Range<u32>,
}

/// Flatten a scene frame into upload-ready buffers. The glow pass draws
/// before the main pass so the soft twin sits behind every string.
pub fn build_frame_buffers(frame: &SceneFrame) -> FrameBuffers {
    let transform: Mat4 = frame.view_projection * frame.globe_model;

    let mut line_vertices =
        Vec::with_capacity(frame.glow_lines.len() + frame.main_lines.len());
    for point in frame.glow_lines.iter().chain(&frame.main_lines) {
        line_vertices.push(LineVertex {
            position: point.position,
            color: point.color,
        });
    }
    let glow_end = frame.glow_lines.len() as u32;
    let main_end = line_vertices.len() as u32;

    let mut sprite_instances =
        Vec::with_capacity(frame.particles.len() + frame.markers.len());
    for sprite in frame.particles.iter().chain(&frame.markers) {
        sprite_instances.push(SpriteInstanceRaw {
            center: sprite.center,
            extent: sprite.extent,
            color: sprite.color,
            alpha: sprite.alpha,
        });
    }
    let particle_end = frame.particles.len() as u32;
    let sprite_end = sprite_instances.len() as u32;

    FrameBuffers {
        uniforms: GlobeUniforms {
            transform: transform.to_cols_array_2d(),
        },
        line_vertices,
        glow_range: 0..glow_end,
        main_range: glow_end..main_end,
        sprite_instances,
        particle_range: 0..particle_end,
        marker_range: particle_end..sprite_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filigree_scene::camera::PointerOffset;
    use filigree_scene::config::SceneConfig;
    use filigree_scene::Scene;

    fn test_frame() -> SceneFrame {
        let config = SceneConfig {
            seed: Some(7),
            ..SceneConfig::default()
        };
        let mut scene = Scene::new(&config, 16.0 / 9.0).expect("valid config");
        scene.tick(0.5, PointerOffset::default())
    }

    #[test]
    fn ranges_partition_the_buffers() {
        let frame = test_frame();
        let buffers = build_frame_buffers(&frame);

        assert_eq!(buffers.glow_range.start, 0);
        assert_eq!(buffers.glow_range.end, buffers.main_range.start);
        assert_eq!(
            buffers.main_range.end as usize,
            buffers.line_vertices.len()
        );

        assert_eq!(buffers.particle_range.start, 0);
        assert_eq!(buffers.particle_range.end, buffers.marker_range.start);
        assert_eq!(
            buffers.marker_range.end as usize,
            buffers.sprite_instances.len()
        );
    }

    #[test]
    fn glow_vertices_precede_main_vertices() {
        let frame = test_frame();
        let buffers = build_frame_buffers(&frame);
        let glow_len = buffers.glow_range.len();
        assert_eq!(glow_len, frame.glow_lines.len());
        for (vertex, point) in buffers.line_vertices[..glow_len]
            .iter()
            .zip(&frame.glow_lines)
        {
            assert_eq!(vertex.position, point.position);
            assert_eq!(vertex.color, point.color);
        }
        for (vertex, point) in buffers.line_vertices[glow_len..]
            .iter()
            .zip(&frame.main_lines)
        {
            assert_eq!(vertex.position, point.position);
        }
    }

    #[test]
    fn uniform_combines_view_projection_and_model() {
        let frame = test_frame();
        let buffers = build_frame_buffers(&frame);
        let expected = (frame.view_projection * frame.globe_model).to_cols_array_2d();
        assert_eq!(buffers.uniforms.transform, expected);
    }

    #[test]
    fn sprite_instances_copy_every_field() {
        let frame = test_frame();
        let buffers = build_frame_buffers(&frame);
        assert!(!buffers.sprite_instances.is_empty());
        let first = &frame.particles[0];
        let raw = &buffers.sprite_instances[0];
        assert_eq!(raw.center, first.center);
        assert_eq!(raw.extent, first.extent);
        assert_eq!(raw.color, first.color);
        assert_eq!(raw.alpha, first.alpha);
    }
}
