/// Tiny Planet Core Library - stereographic panorama mesh and projection math
///
/// This library provides the stateless core for rendering a 360° panorama as
/// a "tiny planet": plane scale calculation, mesh and texture coordinate
/// generation, rotation matrices and the orthographic projection adapter.
/// It produces plain buffers and matrices; uploading them is up to the host.

pub mod config;
pub mod error;
pub mod geometry;
pub mod planet;
pub mod projection;
pub mod scale;
pub mod transform;

// Re-export commonly used types
pub use config::PlanetConfig;
pub use error::{PlanetError, Result};
pub use geometry::{Eye, MeshBuffers, TessellationGrid};
pub use planet::TinyPlanetMesh;
pub use projection::{
    Camera, CameraInput, OrthoFrustum, OrthogonalDirector, PerspectiveProjection, ProjectionMode,
    ProjectionStrategy, TinyPlanetProjection,
};
pub use scale::{AspectExtents, ScaleCalculator, ScaleMode, TextureSize};
pub use transform::{RotationState, Transform};
