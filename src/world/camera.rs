use glam::DVec2;

/// Player view-point on the tile grid.
///
/// * `dir` is the view direction, `plane` the half-width of the camera
///   plane; the ray for screen column `x` is `dir + plane * (2x/w − 1)`.
/// * Both vectors are always rotated together so the determinant
///   `plane × dir` never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pos: DVec2,
    pub dir: DVec2,
    pub plane: DVec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: DVec2::new(22.0, 11.5),
            dir: DVec2::new(-1.0, 0.0),
            plane: DVec2::new(0.0, 0.77),
        }
    }
}

/// Degrees → radians factor used by `set_angle`.
const DEG_TO_RAD: f64 = 0.0174533;

impl Camera {
    pub fn new(pos: DVec2, dir: DVec2, plane: DVec2) -> Self {
        Self { pos, dir, plane }
    }

    /// Ray direction through screen column `x` of a `w`-wide view.
    #[inline(always)]
    pub fn ray_dir(&self, x: usize, w: usize) -> DVec2 {
        let camera_x = 2.0 * x as f64 / w as f64 - 1.0;
        self.dir + self.plane * camera_x
    }

    /// `planeX·dirY − dirX·planeY`; the inverse of this scales sprite
    /// projection.
    #[inline]
    pub fn determinant(&self) -> f64 {
        self.plane.x * self.dir.y - self.dir.x * self.plane.y
    }

    /// Camera space of a world point: `.x` lateral, `.y` depth.
    #[inline]
    pub fn to_cam(&self, p: DVec2, inv_det: f64) -> DVec2 {
        let d = p - self.pos;
        DVec2::new(
            inv_det * (self.dir.y * d.x - self.dir.x * d.y),
            inv_det * (-self.plane.y * d.x + self.plane.x * d.y),
        )
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Rotate `dir` and `plane` by `rad` (positive = counter-clockwise).
    pub fn rotate(&mut self, rad: f64) {
        let rot = DVec2::from_angle(rad);
        self.dir = rot.rotate(self.dir);
        self.plane = rot.rotate(self.plane);
    }

    /// Heading in whole degrees, `0..360`, with `dir = (-1, 0)` at 0.
    pub fn angle(&self) -> i32 {
        let deg = (self.dir.y.atan2(self.dir.x) * (180.0 / std::f64::consts::PI)) as i32;
        (deg + 180) % 360
    }

    /// Turn to heading `deg` by rotating through the difference.
    pub fn set_angle(&mut self, deg: i32) {
        let delta = deg - self.angle();
        self.rotate(delta as f64 * DEG_TO_RAD);
    }

    /// Heading in radians as the skybox scroll reads it, `π..3π`.
    #[inline]
    pub fn sky_heading(&self) -> f64 {
        self.dir.y.atan2(self.dir.x) + 2.0 * std::f64::consts::PI
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_preserves_determinant() {
        let mut cam = Camera::default();
        let det0 = cam.determinant();
        for i in 0..1000 {
            cam.rotate(if i % 3 == 0 { -0.033 } else { 0.0333 });
        }
        assert!((cam.determinant() - det0).abs() < 1e-9);
        assert!((cam.dir.dot(cam.plane)).abs() < 1e-9);
    }

    #[test]
    fn angle_of_default_heading_is_zero() {
        let cam = Camera::default();
        assert_eq!(cam.angle(), 0);
        let east = Camera::new(DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(0.0, 0.66));
        assert_eq!(east.angle(), 180);
        let north = Camera::new(DVec2::ZERO, DVec2::new(0.0, 1.0), DVec2::new(-0.66, 0.0));
        assert_eq!(north.angle(), 270);
    }

    #[test]
    fn set_angle_lands_close() {
        let mut cam = Camera::default();
        cam.set_angle(90);
        assert!((cam.angle() - 90).abs() <= 1);
        // dir = (-1,0) rotated 90° ccw
        assert!((cam.dir - DVec2::new(0.0, -1.0)).length() < 1e-3);
    }

    #[test]
    fn ray_dir_spans_plane() {
        let cam = Camera::new(DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(0.0, 0.66));
        assert_eq!(cam.ray_dir(0, 320), DVec2::new(1.0, -0.66));
        assert_eq!(cam.ray_dir(160, 320), DVec2::new(1.0, 0.0));
    }

    #[test]
    fn to_cam_depth_is_forward_distance() {
        let cam = Camera::new(DVec2::ZERO, DVec2::new(1.0, 0.0), DVec2::new(0.0, 0.66));
        let inv = 1.0 / cam.determinant();
        let t = cam.to_cam(DVec2::new(5.0, 0.0), inv);
        assert!(t.x.abs() < 1e-12);
        assert!((t.y - 5.0).abs() < 1e-12);
    }
}
