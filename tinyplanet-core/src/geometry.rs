/// Tessellated mesh buffers for the tiny planet plane and the panorama sphere
use std::f32::consts::PI;

use log::trace;
use nalgebra::{Point3, Vector3};

use crate::error::{PlanetError, Result, MAX_MESH_POINTS};
use crate::scale::{ScaleCalculator, TextureSize};
use crate::transform::{RotationState, Transform};

/// Zoom applied to the lattice before it is wrapped onto the sphere
pub const STEREO_SCALE: f32 = 10.0;
/// Height of the reference equirectangular frame the mapping is tuned for
pub const STEREO_FRAME_HEIGHT: f32 = 1920.0;
/// Width of the reference equirectangular frame the mapping is tuned for
pub const STEREO_FRAME_WIDTH: f32 = 3840.0;

/// Which eye a buffer is requested for. Both eyes share the same content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

/// Regular rows x columns lattice of (rows + 1) x (columns + 1) points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TessellationGrid {
    pub rows: usize,
    pub columns: usize,
}

impl TessellationGrid {
    pub const TINY_PLANET: Self = Self {
        rows: 200,
        columns: 100,
    };

    /// Build a grid whose points fit a 16-bit index buffer
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        let grid = Self { rows, columns };
        grid.point_count()?;
        Ok(grid)
    }

    pub fn point_count(&self) -> Result<usize> {
        if self.rows == 0 || self.columns == 0 {
            return Err(PlanetError::EmptyGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }
        let points = (self.rows + 1)
            .checked_mul(self.columns + 1)
            .unwrap_or(usize::MAX);
        if points > MAX_MESH_POINTS {
            return Err(PlanetError::CapacityExceeded {
                points,
                max: MAX_MESH_POINTS,
            });
        }
        Ok(points)
    }

    pub fn index_count(&self) -> usize {
        self.rows * self.columns * 6
    }

    /// Lattice coordinates (r, s) in row-major order
    fn lattice(&self) -> impl Iterator<Item = (usize, usize)> {
        let columns = self.columns;
        (0..=self.rows).flat_map(move |r| (0..=columns).map(move |s| (r, s)))
    }
}

impl Default for TessellationGrid {
    fn default() -> Self {
        Self::TINY_PLANET
    }
}

/// Vertex positions (xyz), texture coordinates (uv) and triangle indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u16>,
}

impl MeshBuffers {
    pub fn point_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertices(&self, _eye: Eye) -> &[f32] {
        &self.vertices
    }

    pub fn tex_coords(&self, _eye: Eye) -> &[f32] {
        &self.tex_coords
    }

    pub fn position(&self, index: usize) -> Point3<f32> {
        let v = &self.vertices[index * 3..index * 3 + 3];
        Point3::new(v[0], v[1], v[2])
    }

    pub fn tex_coord(&self, index: usize) -> [f32; 2] {
        [self.tex_coords[index * 2], self.tex_coords[index * 2 + 1]]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }
}

/// Planar, origin-centred vertex positions sized by the calculator's
/// texture extents (call `calculate` first) and the plane rectangle
pub fn generate_vertex_positions(
    calculator: &ScaleCalculator,
    plane_size: TextureSize,
    grid: TessellationGrid,
) -> Result<Vec<f32>> {
    let points = grid.point_count()?;
    let width = calculator.texture_width() * plane_size.width();
    let height = calculator.texture_height() * plane_size.height();
    let row_step = 1.0 / grid.rows as f32;
    let column_step = 1.0 / grid.columns as f32;

    let mut vertices = Vec::with_capacity(points * 3);
    for (r, s) in grid.lattice() {
        vertices.push((s as f32 * column_step - 0.5) * width);
        vertices.push((r as f32 * row_step - 0.5) * height);
        vertices.push(0.0);
    }

    trace!("generated {} vertex floats ({}x{})", vertices.len(), width, height);
    Ok(vertices)
}

/// Longitude/latitude texture coordinates for every lattice point,
/// wrapping the plane onto the unit sphere by inverse stereographic
/// projection and then rotating it
pub fn generate_tex_coords(rotation: &RotationState, grid: TessellationGrid) -> Result<Vec<f32>> {
    let points = grid.point_count()?;
    let matrix = Transform::rotation_matrix(rotation);
    let row_step = 1.0 / grid.rows as f32;
    let column_step = 1.0 / grid.columns as f32;
    // TODO: derive from the configured texture size once the stereo tuning is confirmed
    let aspect = STEREO_FRAME_HEIGHT / STEREO_FRAME_WIDTH;
    let offset = (0.0f32, 0.0f32);

    let mut tex_coords = Vec::with_capacity(points * 2);
    for (r, s) in grid.lattice() {
        let tex_x = s as f32 * column_step;
        let tex_y = r as f32 * row_step;

        let px = (tex_x - 0.5 - offset.0) * STEREO_SCALE;
        let py = (tex_y - 0.5 - offset.1) * STEREO_SCALE * aspect;

        let sphere = stereographic_to_sphere(px, py);
        let rotated = Transform::rotate_vector(&matrix, &sphere);
        let (lon, lat) = sphere_to_lon_lat(&rotated);

        tex_coords.push(lon);
        tex_coords.push(lat);
    }

    Ok(tex_coords)
}

/// Two triangles per cell, row-major, winding preserved for backface culling
pub fn generate_indices(grid: TessellationGrid) -> Result<Vec<u16>> {
    grid.point_count()?;
    let stride = grid.columns + 1;
    // point_count() bounds every index below 65536
    let idx = |r: usize, s: usize| (r * stride + s) as u16;

    let mut indices = Vec::with_capacity(grid.index_count());
    for r in 0..grid.rows {
        for s in 0..grid.columns {
            indices.extend_from_slice(&[
                idx(r, s + 1),
                idx(r + 1, s),
                idx(r, s),
                idx(r, s + 1),
                idx(r + 1, s + 1),
                idx(r + 1, s),
            ]);
        }
    }

    Ok(indices)
}

/// Inverse stereographic projection of a plane point onto the unit sphere
pub fn stereographic_to_sphere(px: f32, py: f32) -> Vector3<f64> {
    let d = px * px + py * py;
    Vector3::new(
        f64::from(2.0 * px / (d + 1.0)),
        f64::from(2.0 * py / (d + 1.0)),
        f64::from((d - 1.0) / (d + 1.0)),
    )
}

/// Normalised (longitude, latitude) in [0, 1] for a point on the sphere
pub fn sphere_to_lon_lat(point: &Vector3<f64>) -> (f32, f32) {
    let distance = point.norm();
    let lon = point.y.atan2(point.x) as f32;
    let lat = (-point.z / distance).acos() as f32;
    (lon / PI * 0.5 + 0.5, lat / PI)
}

/// UV sphere with equirectangular texture coordinates
pub fn build_sphere(radius: f32, stacks: usize, slices: usize) -> Result<MeshBuffers> {
    let grid = TessellationGrid::new(stacks, slices)?;
    let points = grid.point_count()?;

    let mut vertices = Vec::with_capacity(points * 3);
    let mut tex_coords = Vec::with_capacity(points * 2);
    for (i, j) in grid.lattice() {
        let theta = PI * i as f32 / stacks as f32;
        let phi = 2.0 * PI * j as f32 / slices as f32;
        let sin_t = theta.sin();

        vertices.push(radius * phi.cos() * sin_t);
        vertices.push(radius * theta.cos());
        vertices.push(radius * phi.sin() * sin_t);

        tex_coords.push(j as f32 / slices as f32);
        tex_coords.push(i as f32 / stacks as f32);
    }

    Ok(MeshBuffers {
        vertices,
        tex_coords,
        indices: generate_indices(grid)?,
    })
}
