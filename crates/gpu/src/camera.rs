use foundation::math::Vec3;

pub type Mat4 = [[f32; 4]; 4];

const MIN_DISTANCE: f64 = 1e-3;
const MAX_DISTANCE: f64 = 1e7;
/// Keeps the orbit away from the poles where `up` degenerates.
const POLE_EPSILON: f64 = 1e-4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
    /// Width over height.
    pub aspect: f64,
}

impl Camera3D {
    pub fn look_at(position: Vec3, target: Vec3, fov_y_rad: f64, near: f64, far: f64) -> Self {
        Self {
            position,
            target,
            up: Vec3::new(0.0, 1.0, 0.0),
            fov_y_rad,
            near,
            far,
            aspect: 1.0,
        }
    }

    /// Ignores zero-area sizes (minimized windows).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f64 / height as f64;
        }
    }

    pub fn distance(&self) -> f64 {
        (self.position - self.target).length()
    }

    pub fn view_matrix(&self) -> Mat4 {
        mat4_look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        mat4_perspective_rh_z0(self.fov_y_rad, self.aspect, self.near, self.far)
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        mat4_mul(self.projection_matrix(), self.view_matrix())
    }
}

/// Orbit-style user controls around a target point.
///
/// Input moves the camera immediately; `sync` re-aims it at `target`. The
/// renderer calls `sync` every frame, including while a framing animation is
/// driving `target`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self { target }
    }

    /// Rotates the camera around `target`: yaw about +Y, pitch toward the poles.
    pub fn orbit(&self, camera: &mut Camera3D, yaw_rad: f64, pitch_rad: f64) {
        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= 0.0 {
            return;
        }
        let theta = offset.x.atan2(offset.z) + yaw_rad;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() - pitch_rad)
            .clamp(POLE_EPSILON, std::f64::consts::PI - POLE_EPSILON);
        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + offset;
    }

    /// Exponential zoom; positive `delta` moves away from the target.
    pub fn dolly(&self, camera: &mut Camera3D, delta: f64) {
        let offset = camera.position - self.target;
        let distance = offset.length();
        if distance <= 0.0 {
            return;
        }
        let zoomed = (distance * (delta * 0.002).exp()).clamp(MIN_DISTANCE, MAX_DISTANCE);
        camera.position = self.target + offset * (zoomed / distance);
    }

    pub fn sync(&self, camera: &mut Camera3D) {
        camera.target = self.target;
    }
}

pub fn mat4_mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut c = [[0.0f32; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            c[col][row] = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

pub fn mat4_perspective_rh_z0(fov_y_rad: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (0.5 * fov_y_rad).tan();
    let m00 = (f / aspect) as f32;
    let m11 = f as f32;
    let m22 = (far / (near - far)) as f32;
    let m23 = ((near * far) / (near - far)) as f32;

    [
        [m00, 0.0, 0.0, 0.0],
        [0.0, m11, 0.0, 0.0],
        [0.0, 0.0, m22, -1.0],
        [0.0, 0.0, m23, 0.0],
    ]
}

pub fn mat4_look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let f = (target - eye).normalize();
    let s = f.cross(up).normalize();
    let u = s.cross(f);

    let ex = -s.dot(eye);
    let ey = -u.dot(eye);
    let ez = f.dot(eye);

    [
        [s.x as f32, u.x as f32, (-f.x) as f32, 0.0],
        [s.y as f32, u.y as f32, (-f.y) as f32, 0.0],
        [s.z as f32, u.z as f32, (-f.z) as f32, 0.0],
        [ex as f32, ey as f32, ez as f32, 1.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::{Camera3D, OrbitControls, mat4_look_at_rh};
    use foundation::math::Vec3;

    fn camera() -> Camera3D {
        Camera3D::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            75f64.to_radians(),
            0.1,
            1000.0,
        )
    }

    #[test]
    fn look_at_maps_target_onto_negative_z() {
        let view = mat4_look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        // Column-major: translation lives in the last column.
        assert_eq!(view[3], [0.0, 0.0, -5.0, 1.0]);
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut cam = camera();
        cam.set_viewport(1600, 800);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 800);
        assert_eq!(cam.aspect, 2.0);
        let vp = cam.view_proj_matrix();
        assert!(vp.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = camera();
        let controls = OrbitControls::new(Vec3::ZERO);
        controls.orbit(&mut cam, 0.7, 0.3);
        assert!((cam.distance() - 5.0).abs() < 1e-9);
        assert!(cam.position.x > 0.0 && cam.position.y > 0.0);
    }

    #[test]
    fn dolly_scales_distance_and_sync_retargets() {
        let mut cam = camera();
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.dolly(&mut cam, 500.0);
        assert!(cam.distance() > 5.0);
        controls.dolly(&mut cam, -1000.0);
        assert!(cam.distance() < 5.0);

        controls.target = Vec3::new(1.0, 2.0, 3.0);
        controls.sync(&mut cam);
        assert_eq!(cam.target, Vec3::new(1.0, 2.0, 3.0));
    }
}
