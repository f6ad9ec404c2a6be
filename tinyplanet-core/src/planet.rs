/// Tiny planet mesh object with its vertex dirty-check
use log::debug;
use nalgebra::Vector3;

use crate::error::Result;
use crate::geometry::{
    generate_indices, generate_tex_coords, generate_vertex_positions, MeshBuffers,
    TessellationGrid,
};
use crate::scale::{ScaleCalculator, TextureSize};
use crate::transform::RotationState;

/// Owns the published mesh and the texture ratio it was built for.
///
/// Only the rendering thread should drive this; buffers are rebuilt in
/// scratch space and replaced whole.
#[derive(Debug, Clone)]
pub struct TinyPlanetMesh {
    grid: TessellationGrid,
    plane_size: TextureSize,
    prev_ratio: f32,
    buffers: Option<MeshBuffers>,
}

impl TinyPlanetMesh {
    pub fn new(plane_size: TextureSize) -> Self {
        Self::with_grid(plane_size, TessellationGrid::TINY_PLANET)
    }

    pub fn with_grid(plane_size: TextureSize, grid: TessellationGrid) -> Self {
        Self {
            grid,
            plane_size,
            prev_ratio: 0.0,
            buffers: None,
        }
    }

    /// Where the plane sits in world space, in front of the camera
    pub fn model_position() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, -2.0)
    }

    pub fn grid(&self) -> TessellationGrid {
        self.grid
    }

    pub fn plane_size(&self) -> TextureSize {
        self.plane_size
    }

    /// Texture ratio the current vertices were generated for
    pub fn prev_ratio(&self) -> f32 {
        self.prev_ratio
    }

    pub fn buffers(&self) -> Option<&MeshBuffers> {
        self.buffers.as_ref()
    }

    pub fn num_indices(&self) -> usize {
        self.buffers.as_ref().map_or(0, MeshBuffers::num_indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.buffers.as_ref().map_or(0, MeshBuffers::triangle_count)
    }

    /// Build vertices, texture coordinates and indices and publish them together
    pub fn load(
        &mut self,
        calculator: &mut ScaleCalculator,
        rotation: &RotationState,
    ) -> Result<()> {
        let vertices = self.generate_vertices(calculator)?;
        let tex_coords = generate_tex_coords(rotation, self.grid)?;
        let indices = generate_indices(self.grid)?;

        debug!(
            "tiny planet mesh loaded: {} points, {} triangles",
            vertices.len() / 3,
            indices.len() / 3
        );
        self.prev_ratio = calculator.texture_ratio();
        self.buffers = Some(MeshBuffers {
            vertices,
            tex_coords,
            indices,
        });
        Ok(())
    }

    /// Regenerate vertex positions when the texture ratio moved.
    ///
    /// Returns `true` when the vertex buffer was replaced and needs to be
    /// resubmitted. Texture coordinates and indices are never touched.
    pub fn update_vertices_if_needed(&mut self, calculator: &mut ScaleCalculator) -> Result<bool> {
        if self.buffers.is_none() {
            return Ok(false);
        }

        let ratio = calculator.texture_ratio();
        if ratio == self.prev_ratio {
            return Ok(false);
        }

        let vertices = self.generate_vertices(calculator)?;
        debug!("texture ratio {} -> {}, vertices regenerated", self.prev_ratio, ratio);
        if let Some(buffers) = self.buffers.as_mut() {
            buffers.vertices = vertices;
        }
        self.prev_ratio = ratio;
        Ok(true)
    }

    fn generate_vertices(&self, calculator: &mut ScaleCalculator) -> Result<Vec<f32>> {
        calculator.calculate();
        generate_vertex_positions(calculator, self.plane_size, self.grid)
    }
}

impl Default for TinyPlanetMesh {
    fn default() -> Self {
        Self::new(TextureSize::unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Eye;
    use crate::scale::ScaleMode;

    fn small_mesh() -> TinyPlanetMesh {
        TinyPlanetMesh::with_grid(TextureSize::unit(), TessellationGrid::new(4, 2).unwrap())
    }

    #[test]
    fn test_load_publishes_all_buffers() {
        let mut calc = ScaleCalculator::new(ScaleMode::Fit, TextureSize::panorama_4k());
        let mut mesh = TinyPlanetMesh::default();
        assert!(mesh.buffers().is_none());
        assert_eq!(mesh.triangle_count(), 0);

        mesh.load(&mut calc, &RotationState::zero()).unwrap();
        let buffers = mesh.buffers().unwrap();
        assert_eq!(buffers.point_count(), 201 * 101);
        assert_eq!(buffers.tex_coords(Eye::Left).len(), 201 * 101 * 2);
        assert_eq!(mesh.triangle_count(), 200 * 100 * 2);
        assert_eq!(mesh.num_indices(), 200 * 100 * 6);
        assert_eq!(mesh.prev_ratio(), 2.0);
    }

    #[test]
    fn test_update_skipped_when_ratio_unchanged() {
        let mut calc = ScaleCalculator::new(ScaleMode::Fit, TextureSize::new(2.0, 1.0).unwrap());
        let mut mesh = small_mesh();
        mesh.load(&mut calc, &RotationState::zero()).unwrap();
        let before = mesh.buffers().unwrap().vertices.as_ptr();

        // a viewport change alone leaves the texture ratio as it was
        calc.set_viewport_ratio(3.0).unwrap();
        assert!(!mesh.update_vertices_if_needed(&mut calc).unwrap());
        assert!(!mesh.update_vertices_if_needed(&mut calc).unwrap());
        assert_eq!(mesh.buffers().unwrap().vertices.as_ptr(), before);
    }

    #[test]
    fn test_update_on_ratio_change() {
        let mut calc = ScaleCalculator::new(ScaleMode::Fit, TextureSize::new(2.0, 1.0).unwrap());
        let mut mesh = small_mesh();
        mesh.load(&mut calc, &RotationState::zero()).unwrap();
        let tex_coords = mesh.buffers().unwrap().tex_coords.clone();
        let indices = mesh.buffers().unwrap().indices.clone();
        let old_vertices = mesh.buffers().unwrap().vertices.clone();

        calc.set_texture_size(TextureSize::new(1.0, 2.0).unwrap());
        assert!(mesh.update_vertices_if_needed(&mut calc).unwrap());
        assert_eq!(mesh.prev_ratio(), 0.5);

        let buffers = mesh.buffers().unwrap();
        assert_ne!(buffers.vertices, old_vertices);
        assert_eq!(buffers.tex_coords, tex_coords);
        assert_eq!(buffers.indices, indices);

        // fit, viewport 1.0 > texture 0.5: texture extents 0.5 x 1.0
        assert_eq!(&buffers.vertices[0..2], &[-0.25, -0.5]);
        assert!(!mesh.update_vertices_if_needed(&mut calc).unwrap());
    }

    #[test]
    fn test_update_before_load_is_noop() {
        let mut calc = ScaleCalculator::new(ScaleMode::Full, TextureSize::unit());
        let mut mesh = small_mesh();
        assert!(!mesh.update_vertices_if_needed(&mut calc).unwrap());
        assert!(mesh.buffers().is_none());
    }
}
