//! 3D helpers for the node network: shell sampling, rotation, perspective

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

/// Focal length of the virtual camera
pub const FIELD_OF_VIEW: f32 = 500.0;
/// Camera distance from the origin along +z
pub const DEPTH_OFFSET: f32 = 600.0;
/// Denominator floor so points behind the camera never divide by ~0
const MIN_DEPTH: f32 = 1.0;

/// Uniform point on a spherical shell with radius in `[min_radius, max_radius]`
pub fn sample_shell<R: Rng>(rng: &mut R, min_radius: f32, max_radius: f32) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    // acos(1 - 2u) keeps the polar distribution uniform over the sphere
    let phi = (1.0 - 2.0 * rng.random::<f32>()).clamp(-1.0, 1.0).acos();
    let radius = if max_radius > min_radius {
        rng.random_range(min_radius..=max_radius)
    } else {
        min_radius
    };
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Rotate about Y by `yaw`, then about X by `pitch`
pub fn rotate(p: Vec3, yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let x = p.x * cy - p.z * sy;
    let z = p.x * sy + p.z * cy;

    let (sp, cp) = pitch.sin_cos();
    let y = p.y * cp - z * sp;
    let z = p.y * sp + z * cp;
    Vec3::new(x, y, z)
}

/// A point after perspective projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub pos: Vec2,
    /// Perspective scale; larger means nearer
    pub scale: f32,
    /// Camera-space depth; larger means farther
    pub depth: f32,
}

/// Perspective-project a rotated point onto the screen around `center`
pub fn project(p: Vec3, center: Vec2, view_scale: f32) -> Projected {
    let depth = DEPTH_OFFSET + p.z;
    let scale = FIELD_OF_VIEW / depth.max(MIN_DEPTH);
    Projected {
        pos: center + Vec2::new(p.x, p.y) * scale * view_scale,
        scale,
        depth,
    }
}

/// One step of damped exponential approach
pub fn approach(current: f32, target: f32, damping: f32) -> f32 {
    current + (target - current) * damping
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_shell_samples_stay_in_band() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            let p = sample_shell(&mut rng, 180.0, 240.0);
            let r = p.length();
            assert!((179.9..=240.1).contains(&r), "radius {r}");
        }
    }

    #[test]
    fn test_rotation_preserves_length() {
        let p = Vec3::new(120.0, -40.0, 75.0);
        let r = rotate(p, 1.3, -0.7);
        assert!((p.length() - r.length()).abs() < 1e-3);
        assert_eq!(rotate(p, 0.0, 0.0), p);
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let r = rotate(Vec3::X, std::f32::consts::FRAC_PI_2, 0.0);
        assert!((r - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_nearer_points_project_larger() {
        let center = Vec2::new(400.0, 300.0);
        let near = project(Vec3::new(100.0, 0.0, -200.0), center, 1.0);
        let far = project(Vec3::new(100.0, 0.0, 200.0), center, 1.0);
        assert!(near.scale > far.scale);
        assert!(near.depth < far.depth);
        assert!(near.pos.x - center.x > far.pos.x - center.x);
        assert_eq!(project(Vec3::ZERO, center, 1.0).pos, center);
    }

    #[test]
    fn test_approach_converges() {
        let mut v = 0.0;
        for _ in 0..200 {
            v = approach(v, 1.0, 0.05);
        }
        assert!((v - 1.0).abs() < 1e-3);
    }
}
