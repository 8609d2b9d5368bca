//! Golden-angle point distribution over a sphere surface. The irrational
//! angular increment avoids the banding a latitude/longitude grid would show
//! once the string chords are drawn between neighbours.

use std::f32::consts::PI;

use glam::Vec3;

/// Distribute `count` points near-uniformly over a sphere of radius `radius`.
///
/// The sweep runs `y` linearly from the north pole (+1) to the south pole
/// (-1) while the azimuth advances by the golden angle per point. Counts
/// below 2 are clamped up; the sweep needs both poles to be well defined.
/// Deterministic for a given `count` - no randomness is involved.
pub fn sphere_points(count: usize, radius: f32) -> Vec<Vec3> {
    let count = count.max(2);
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());

    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let y = 1.0 - (i as f32 / (count - 1) as f32) * 2.0;
        let radius_at_y = (1.0 - y * y).sqrt();
        let phi = golden_angle * i as f32;
        points.push(Vec3::new(phi.cos() * radius_at_y, y, phi.sin() * radius_at_y) * radius);
    }
    points
}
