use serde::{Deserialize, Serialize};

/// 2-D world position / direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        self.distance_sq(other).sqrt()
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector toward `target`; zero when the points coincide.
    pub fn direction_to(self, target: Vec2) -> Vec2 {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < 1e-6 {
            return Vec2::ZERO;
        }
        Vec2::new(dx / len, dy / len)
    }

    pub fn angle_to(self, target: Vec2) -> f32 {
        (target.y - self.y).atan2(target.x - self.x)
    }

    /// Perpendicular (rotated 90 degrees counter-clockwise).
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }

    pub fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        Vec2::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
        )
    }

    pub fn from_angle(angle: f32) -> Vec2 {
        Vec2::new(angle.cos(), angle.sin())
    }
}

/// Whether `point` lies inside a cone rooted at `origin`, facing `cone_angle`,
/// with the given half-angle and range.
pub fn within_cone(origin: Vec2, cone_angle: f32, half_angle: f32, range: f32, point: Vec2) -> bool {
    let dist_sq = origin.distance_sq(point);
    if dist_sq > range * range {
        return false;
    }
    if dist_sq < 1e-6 {
        return true;
    }
    let to_point = origin.angle_to(point);
    angle_delta(cone_angle, to_point).abs() <= half_angle
}

/// Smallest signed difference between two angles, in (-PI, PI].
pub fn angle_delta(a: f32, b: f32) -> f32 {
    let mut d = b - a;
    while d > std::f32::consts::PI {
        d -= std::f32::consts::TAU;
    }
    while d <= -std::f32::consts::PI {
        d += std::f32::consts::TAU;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn distance_basics() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_sq(b), 25.0);
    }

    #[test]
    fn direction_to_is_unit() {
        let d = Vec2::new(1.0, 1.0).direction_to(Vec2::new(5.0, 1.0));
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn direction_to_self_is_zero() {
        let p = Vec2::new(2.0, 3.0);
        assert_eq!(p.direction_to(p), Vec2::ZERO);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, -10.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(5.0, -5.0));
    }

    #[test]
    fn angle_delta_wraps() {
        assert!((angle_delta(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-5);
        assert!((angle_delta(0.0, FRAC_PI_2) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn cone_membership() {
        let origin = Vec2::ZERO;
        // Facing +X with a 45 degree half-angle, 10 unit range.
        assert!(within_cone(origin, 0.0, FRAC_PI_4, 10.0, Vec2::new(5.0, 1.0)));
        // Behind the cone.
        assert!(!within_cone(origin, 0.0, FRAC_PI_4, 10.0, Vec2::new(-5.0, 0.0)));
        // In the cone direction but out of range.
        assert!(!within_cone(origin, 0.0, FRAC_PI_4, 10.0, Vec2::new(50.0, 0.0)));
        // Origin itself always counts.
        assert!(within_cone(origin, 0.0, FRAC_PI_4, 10.0, origin));
    }
}
