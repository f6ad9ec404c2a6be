/// Euler rotation state and the matrices built from it
use nalgebra::{Matrix3, Matrix4, Vector3};

/// Rotation around three axes (in degrees)
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

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
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
    /// Tait-Bryan rotation, intrinsic X then Y then Z.
    ///
    /// Entries `m1..m9` are laid out column by column, so `m1, m2, m3`
    /// form the first column and `rotate_vector` computes `M * v`.
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix3<f64> {
        let (sx, cx) = f64::from(rotation.x).to_radians().sin_cos();
        let (sy, cy) = f64::from(rotation.y).to_radians().sin_cos();
        let (sz, cz) = f64::from(rotation.z).to_radians().sin_cos();

        let m1 = cy * cz;
        let m2 = cx * sz + sx * sy * cz;
        let m3 = sx * sz - cx * sy * cz;
        let m4 = -cy * sz;
        let m5 = cx * cz - sx * sy * sz;
        let m6 = sx * cz + cx * sy * sz;
        let m7 = sy;
        let m8 = -sx * cy;
        let m9 = cx * cy;

        Matrix3::from_column_slice(&[m1, m2, m3, m4, m5, m6, m7, m8, m9])
    }

    pub fn rotate_vector(matrix: &Matrix3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
        matrix * v
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
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
