/// Camera and projection strategies
use log::debug;
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use crate::config::PlanetConfig;
use crate::error::{ensure_positive, Result};
use crate::geometry::{build_sphere, MeshBuffers};
use crate::planet::TinyPlanetMesh;
use crate::scale::ScaleCalculator;
use crate::transform::{RotationState, Transform};

/// Which strategy renders the panorama
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Flattened stereographic plane under an orthographic camera
    TinyPlanet,
    /// Inside of a textured sphere under a perspective camera
    Perspective,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::TinyPlanet => ProjectionMode::Perspective,
            ProjectionMode::Perspective => ProjectionMode::TinyPlanet,
        }
    }

    /// Build and load the strategy for this mode
    pub fn create(
        self,
        config: &PlanetConfig,
        camera: &Camera,
    ) -> Result<Box<dyn ProjectionStrategy>> {
        let mut strategy: Box<dyn ProjectionStrategy> = match self {
            ProjectionMode::TinyPlanet => {
                Box::new(TinyPlanetProjection::from_config(config, camera)?)
            }
            ProjectionMode::Perspective => Box::new(PerspectiveProjection::new()),
        };
        strategy.load()?;
        Ok(strategy)
    }
}

/// Camera configuration shared by every strategy
#[derive(Debug, Clone)]
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
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width.max(1) as f32 / height.max(1) as f32,
            near: 0.7,
            far: 500.0,
        }
    }

    /// Update the viewport ratio (width / height)
    pub fn set_aspect(&mut self, aspect: f32) -> Result<()> {
        self.aspect = ensure_positive("viewport ratio", aspect)?;
        Ok(())
    }

    pub fn set_near(&mut self, near: f32) -> Result<()> {
        self.near = ensure_positive("near distance", near)?;
        Ok(())
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn perspective_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Standard OpenGL `orthoM` construction
    pub fn ortho_matrix(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        Matrix4::new_orthographic(left, right, bottom, top, near, far)
    }

    /// Project a 3D point to 2D screen space
    pub fn project_to_screen(
        point: &Point3<f32>,
        mvp: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero w
        if clip.w.abs() < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        // Clip test
        if !(-1.0..=1.0).contains(&depth) || clip.w < 0.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Column-major 16 floats, ready for a GL uniform upload
pub fn to_gl_array(matrix: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(matrix.as_slice());
    out
}

/// Interactive camera input forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraInput {
    /// Horizontal drag, in degrees
    DeltaX(f32),
    /// Vertical drag, in degrees
    DeltaY(f32),
    /// Device orientation as a rotation matrix
    Sensor(Matrix4<f32>),
}

/// The capability set a projection strategy offers the renderer
pub trait ProjectionStrategy {
    fn mode(&self) -> ProjectionMode;

    /// Build the mesh buffers; called once before the first frame
    fn load(&mut self) -> Result<()>;

    fn mesh(&self) -> Option<&MeshBuffers>;

    /// Refresh mesh data that depends on viewport state.
    /// Returns `true` when vertex buffers must be resubmitted.
    fn update_mesh(&mut self) -> Result<bool>;

    fn model_position(&self) -> Vector3<f32>;

    fn projection_matrix(&mut self, camera: &Camera) -> Result<Matrix4<f32>>;

    fn view_matrix(&self, camera: &Camera) -> Matrix4<f32>;

    fn apply_input(&mut self, input: CameraInput);

    fn model_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(&self.model_position())
    }
}

/// Orthographic extents handed to `orthoM`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoFrustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoFrustum {
    pub fn matrix(&self) -> Matrix4<f32> {
        Camera::ortho_matrix(self.left, self.right, self.bottom, self.top, self.near, self.far)
    }
}

/// Orthographic director tracking the plane scale calculator
#[derive(Debug, Clone)]
pub struct OrthogonalDirector {
    near_base: f32,
}

impl OrthogonalDirector {
    pub const NEAR: f32 = 1.0;
    pub const FAR: f32 = 500.0;

    /// Snapshot the camera's near distance at construction
    pub fn new(camera: &Camera) -> Self {
        Self {
            near_base: camera.near,
        }
    }

    pub fn near_base(&self) -> f32 {
        self.near_base
    }

    /// Recalculate the plane extents for the camera's viewport and derive
    /// the frustum, scaled so the plane keeps its apparent size if the
    /// near distance changed since construction
    pub fn update_projection(
        &self,
        calculator: &mut ScaleCalculator,
        camera: &Camera,
    ) -> Result<OrthoFrustum> {
        calculator.set_viewport_ratio(camera.aspect)?;
        let extents = calculator.calculate();
        let scale = self.near_base / camera.near;

        let half_width = extents.viewport_width * 0.5 * scale;
        let half_height = extents.viewport_height * 0.5 * scale;
        debug!("ortho frustum {half_width}x{half_height} (scale {scale})");

        Ok(OrthoFrustum {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near: Self::NEAR,
            far: Self::FAR,
        })
    }
}

/// Tiny planet: stereographic plane seen through an orthographic camera
#[derive(Debug, Clone)]
pub struct TinyPlanetProjection {
    calculator: ScaleCalculator,
    mesh: TinyPlanetMesh,
    director: OrthogonalDirector,
    rotation: RotationState,
}

impl TinyPlanetProjection {
    /// The calculator takes the camera aspect as its viewport ratio so the
    /// first `load` already builds the plane for the real viewport
    pub fn new(
        mut calculator: ScaleCalculator,
        mesh: TinyPlanetMesh,
        rotation: RotationState,
        camera: &Camera,
    ) -> Result<Self> {
        calculator.set_viewport_ratio(camera.aspect)?;
        Ok(Self {
            calculator,
            mesh,
            director: OrthogonalDirector::new(camera),
            rotation,
        })
    }

    pub fn from_config(config: &PlanetConfig, camera: &Camera) -> Result<Self> {
        Self::new(
            ScaleCalculator::new(config.mode, config.texture_size),
            TinyPlanetMesh::new(config.plane_size),
            config.rotation,
            camera,
        )
    }

    pub fn calculator(&self) -> &ScaleCalculator {
        &self.calculator
    }

    pub fn calculator_mut(&mut self) -> &mut ScaleCalculator {
        &mut self.calculator
    }

    pub fn planet(&self) -> &TinyPlanetMesh {
        &self.mesh
    }

    pub fn director(&self) -> &OrthogonalDirector {
        &self.director
    }

    pub fn frustum(&mut self, camera: &Camera) -> Result<OrthoFrustum> {
        self.director.update_projection(&mut self.calculator, camera)
    }
}

impl ProjectionStrategy for TinyPlanetProjection {
    fn mode(&self) -> ProjectionMode {
        ProjectionMode::TinyPlanet
    }

    fn load(&mut self) -> Result<()> {
        self.mesh.load(&mut self.calculator, &self.rotation)
    }

    fn mesh(&self) -> Option<&MeshBuffers> {
        self.mesh.buffers()
    }

    fn update_mesh(&mut self) -> Result<bool> {
        self.mesh.update_vertices_if_needed(&mut self.calculator)
    }

    fn model_position(&self) -> Vector3<f32> {
        TinyPlanetMesh::model_position()
    }

    fn projection_matrix(&mut self, camera: &Camera) -> Result<Matrix4<f32>> {
        Ok(self.frustum(camera)?.matrix())
    }

    /// Always axis aligned: the camera's own look-at, no input rotation
    fn view_matrix(&self, camera: &Camera) -> Matrix4<f32> {
        camera.view_matrix()
    }

    /// Ignores all input. Pan, tilt and device orientation have no effect
    /// on the flattened tiny planet view.
    fn apply_input(&mut self, _input: CameraInput) {}
}

/// Standard spherical panorama viewed from the centre
#[derive(Debug, Clone)]
pub struct PerspectiveProjection {
    radius: f32,
    stacks: usize,
    slices: usize,
    yaw: f32,
    pitch: f32,
    sensor: Matrix4<f32>,
    mesh: Option<MeshBuffers>,
}

impl PerspectiveProjection {
    pub const SPHERE_RADIUS: f32 = 18.0;
    pub const SPHERE_STACKS: usize = 75;
    pub const SPHERE_SLICES: usize = 150;

    pub fn new() -> Self {
        Self {
            radius: Self::SPHERE_RADIUS,
            stacks: Self::SPHERE_STACKS,
            slices: Self::SPHERE_SLICES,
            yaw: 0.0,
            pitch: 0.0,
            sensor: Matrix4::identity(),
            mesh: None,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

impl Default for PerspectiveProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionStrategy for PerspectiveProjection {
    fn mode(&self) -> ProjectionMode {
        ProjectionMode::Perspective
    }

    fn load(&mut self) -> Result<()> {
        self.mesh = Some(build_sphere(self.radius, self.stacks, self.slices)?);
        Ok(())
    }

    fn mesh(&self) -> Option<&MeshBuffers> {
        self.mesh.as_ref()
    }

    fn update_mesh(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn model_position(&self) -> Vector3<f32> {
        Vector3::zeros()
    }

    fn projection_matrix(&mut self, camera: &Camera) -> Result<Matrix4<f32>> {
        Ok(camera.perspective_matrix())
    }

    fn view_matrix(&self, camera: &Camera) -> Matrix4<f32> {
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians());
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw.to_radians());
        camera.view_matrix() * self.sensor * pitch.to_homogeneous() * yaw.to_homogeneous()
    }

    fn apply_input(&mut self, input: CameraInput) {
        match input {
            CameraInput::DeltaX(dx) => self.yaw = (self.yaw + dx) % 360.0,
            CameraInput::DeltaY(dy) => self.pitch = (self.pitch + dy).clamp(-90.0, 90.0),
            CameraInput::Sensor(matrix) => self.sensor = matrix,
        }
    }
}
