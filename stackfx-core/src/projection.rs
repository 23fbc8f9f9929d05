/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::CameraSettings;

/// A projected vertex: pixel coordinates plus NDC depth in `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Perspective camera for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_settings(&CameraSettings::default(), width, height)
    }

    pub fn from_settings(settings: &CameraSettings, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: settings.position,
            target: settings.target,
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: settings.fov_degrees.to_radians(),
            aspect: 1.0,
            near: settings.near,
            far: settings.far,
        };
        camera.resize(width, height, 1.0);
        camera
    }

    /// Track a new surface size. `pixel_aspect` is the width/height ratio of
    /// a single pixel (terminal cells are roughly twice as tall as wide).
    pub fn resize(&mut self, width: u32, height: u32, pixel_aspect: f32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 * pixel_aspect / height as f32;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Project through a precomputed model-view-projection matrix.
///
/// Points behind the eye or outside the depth range are rejected; points off
/// the sides of the screen are kept so the rasterizer can clip partially
/// visible triangles.
pub fn project(mvp: &Matrix4<f32>, point: &Point3<f32>, width: u32, height: u32) -> Option<ScreenPoint> {
    let clip = mvp * point.to_homogeneous();

    // Prevent division by near-zero depth values
    if clip.w <= 1e-6 {
        return None;
    }

    let ndc = clip.xyz() / clip.w;
    if !(-1.0..=1.0).contains(&ndc.z) {
        return None;
    }

    Some(ScreenPoint {
        x: (ndc.x + 1.0) * 0.5 * width as f32,
        y: (1.0 - ndc.y) * 0.5 * height as f32,
        depth: ndc.z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn to_screen(camera: &Camera, point: Point3<f32>, size: u32) -> Option<ScreenPoint> {
        let mvp = Transform::mvp_matrix(
            &Matrix4::identity(),
            &camera.view_matrix(),
            &camera.projection_matrix(),
        );
        project(&mvp, &point, size, size)
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!((camera.fov - 50f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_target_projects_to_centre() {
        let camera = Camera::new(600, 600);
        let p = to_screen(&camera, camera.target, 600).unwrap();
        assert!((p.x - 300.0).abs() < 1e-2);
        assert!((p.y - 300.0).abs() < 1e-2);
    }

    #[test]
    fn test_nearer_points_have_smaller_depth() {
        let camera = Camera::new(100, 100);
        let near = to_screen(&camera, Point3::new(0.0, 1.0, 2.0), 100).unwrap();
        let far = to_screen(&camera, Point3::new(0.0, 1.0, -2.0), 100).unwrap();
        assert!(near.depth < far.depth);
    }

    #[test]
    fn test_behind_camera_is_rejected() {
        let camera = Camera::new(100, 100);
        let behind = Point3::new(0.0, 1.5, 20.0);
        assert!(to_screen(&camera, behind, 100).is_none());
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = Camera::new(100, 100);
        let high = to_screen(&camera, Point3::new(0.0, 3.0, 0.0), 100).unwrap();
        let low = to_screen(&camera, Point3::new(0.0, -1.0, 0.0), 100).unwrap();
        assert!(high.y < low.y);
    }

    #[test]
    fn test_resize_with_tall_pixels() {
        let mut camera = Camera::new(800, 600);
        camera.resize(80, 40, 0.5);
        assert!((camera.aspect - 1.0).abs() < 1e-6);
        camera.resize(0, 40, 0.5);
        assert!((camera.aspect - 1.0).abs() < 1e-6);
    }
}
