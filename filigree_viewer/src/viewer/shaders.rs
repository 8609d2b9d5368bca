use bytemuck::{Pod, Zeroable};

/// String chords: globe-local positions transformed by one combined
/// view-projection-model matrix, flat per-vertex color.
pub(super) const LINE_SHADER_SOURCE: &str = r#"
struct GlobeTransform {
    transform: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globe: GlobeTransform;

struct VertexIn {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(input: VertexIn) -> VertexOut {
    var out: VertexOut;
    out.position = globe.transform * vec4<f32>(input.position, 1.0);
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: VertexOut) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

/// Screen-space sprites: the instance carries a pre-projected NDC centre and
/// half-extents, the quad corner fans out from it. The fragment stage rounds
/// the quad into a soft disc.
pub(super) const SPRITE_SHADER_SOURCE: &str = r#"
struct VertexIn {
    @location(0) corner: vec2<f32>,
    @location(1) center: vec2<f32>,
    @location(2) extent: vec2<f32>,
    @location(3) color: vec3<f32>,
    @location(4) alpha: f32,
};

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) local_pos: vec2<f32>,
    @location(2) alpha: f32,
};

@vertex
fn vs_main(input: VertexIn) -> VertexOut {
    var out: VertexOut;
    out.position = vec4<f32>(input.center + input.corner * input.extent * 2.0, 0.0, 1.0);
    out.color = input.color;
    out.local_pos = input.corner;
    out.alpha = input.alpha;
    return out;
}

@fragment
fn fs_main(input: VertexOut) -> @location(0) vec4<f32> {
    let radius = length(input.local_pos) * 2.0;
    let falloff = 1.0 - smoothstep(0.45, 1.0, radius);
    let alpha = input.alpha * falloff;
    if alpha < 0.01 {
        discard;
    }
    return vec4<f32>(input.color, alpha);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct SpriteQuadVertex {
    pub position: [f32; 2],
}

pub(super) const SPRITE_QUAD_VERTICES: [SpriteQuadVertex; 6] = [
    SpriteQuadVertex {
        position: [-0.5, -0.5],
    },
    SpriteQuadVertex {
        position: [0.5, -0.5],
    },
    SpriteQuadVertex {
        position: [-0.5, 0.5],
    },
    SpriteQuadVertex {
        position: [-0.5, 0.5],
    },
    SpriteQuadVertex {
        position: [0.5, -0.5],
    },
    SpriteQuadVertex {
        position: [0.5, 0.5],
    },
];
