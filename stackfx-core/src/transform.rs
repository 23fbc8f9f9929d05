/// 3D transformation matrices, rotation state and positionable nodes
use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state.
    ///
    /// Rotations are applied Z first, then Y, then X, so a pitch on X always
    /// tilts about the parent's horizontal axis regardless of the current yaw.
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        rx * ry * rz
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

/// A positionable scene node: translation, rotation and uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub position: Point3<f32>,
    pub rotation: RotationState,
    pub scale: f32,
}

impl Node {
    pub fn new() -> Self {
        Self {
            position: Point3::origin(),
            rotation: RotationState::zero(),
            scale: 1.0,
        }
    }

    pub fn at_height(y: f32) -> Self {
        Self {
            position: Point3::new(0.0, y, 0.0),
            ..Self::new()
        }
    }

    /// Local-to-parent matrix: scale, then rotate, then translate
    pub fn matrix(&self) -> Matrix4<f32> {
        let p = self.position;
        Transform::translation_matrix(p.x, p.y, p.z)
            * Transform::rotation_matrix(&self.rotation)
            * Matrix4::new_scaling(self.scale)
    }

    /// Clear the transient channels a transition perturbs (X/Z tilt and
    /// scale), keeping position and the Y spin.
    pub fn settle(&mut self) {
        self.rotation.x = 0.0;
        self.rotation.z = 0.0;
        self.scale = 1.0;
    }

    #[cfg(test)]
    pub(crate) fn is_settled(&self) -> bool {
        self.rotation.x == 0.0 && self.rotation.z == 0.0 && self.scale == 1.0
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_pitch_applies_after_yaw() {
        // A quarter yaw turns +X into -Z; the pitch then tilts that about world X
        let rotation = RotationState::new(FRAC_PI_2, FRAC_PI_2, 0.0);
        let matrix = Transform::rotation_matrix(&rotation);
        let p = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_node_matrix() {
        let mut node = Node::at_height(2.0);
        node.scale = 2.0;
        let p = node.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(2.0, 2.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_settle_keeps_spin() {
        let mut node = Node::at_height(1.0);
        node.rotation = RotationState::new(0.02, 1.5, 0.01);
        node.scale = 1.08;
        assert!(!node.is_settled());
        node.settle();
        assert!(node.is_settled());
        assert_eq!(node.rotation.y, 1.5);
        assert_eq!(node.position.y, 1.0);
    }
}
