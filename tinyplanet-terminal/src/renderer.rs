/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;
use std::io::Write;
use tinyplanet_core::{Camera, MeshBuffers};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Screen-space vertex: position, depth and texture coordinate
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    uv: [f32; 2],
}

/// ASCII renderer that rasterizes textured meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    /// Rasterize every triangle of the mesh, sampling the procedural
    /// panorama through the mesh texture coordinates
    pub fn render_mesh(&mut self, mesh: &MeshBuffers, mvp: &Matrix4<f32>) {
        let (width, height) = (self.width as u32, self.height as u32);
        let projected: Vec<Option<ScreenVertex>> = (0..mesh.point_count())
            .map(|i| {
                Camera::project_to_screen(&mesh.position(i), mvp, width, height)
                    .map(|(x, y, depth)| ScreenVertex {
                        x,
                        y,
                        depth,
                        uv: mesh.tex_coord(i),
                    })
            })
            .collect();

        for [a, b, c] in mesh.triangles() {
            // Triangle is clipped if any corner is
            if let (Some(v0), Some(v1), Some(v2)) = (projected[a], projected[b], projected[c]) {
                self.rasterize_triangle([v0, v1, v2]);
            }
        }
    }

    fn rasterize_triangle(&mut self, mut vertices: [ScreenVertex; 3]) {
        unwrap_seam(&mut vertices);
        let [v0, v1, v2] = vertices;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    let u = (w0 * v0.uv[0] + w1 * v1.uv[0] + w2 * v2.uv[0]).fract();
                    let v = w0 * v0.uv[1] + w1 * v1.uv[1] + w2 * v2.uv[1];
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = shade(sample_panorama(u, v));
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_at(x, y);

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGrey,
                    '-' | '=' => Color::Grey,
                    '+' | '*' => Color::White,
                    '#' | '%' | '@' => Color::Cyan,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Longitudes wrap at 1.0; shift corners so a triangle crossing the seam
/// interpolates the short way round
fn unwrap_seam(vertices: &mut [ScreenVertex; 3]) {
    let max_u = vertices.iter().map(|v| v.uv[0]).fold(f32::MIN, f32::max);
    for v in vertices.iter_mut() {
        if max_u - v.uv[0] > 0.5 {
            v.uv[0] += 1.0;
        }
    }
}

/// Brightness in [0, 1] of a synthetic equirectangular panorama.
///
/// Latitude 0 is the nadir: ground near 0, a skyline around the horizon,
/// sky towards 1. Meridians every 30 degrees make rotation visible.
pub fn sample_panorama(u: f32, v: f32) -> f32 {
    let meridian = (u * 12.0).fract();
    if meridian < 0.02 || meridian > 0.98 {
        return 1.0;
    }

    let skyline = 0.5 + 0.08 * ((u * 40.0).floor() * 1.7).sin().abs();
    if v < 0.5 {
        // ground, checkered
        let checker = ((u * 24.0).floor() + (v * 12.0).floor()) as i32 % 2 == 0;
        if checker {
            0.45
        } else {
            0.3
        }
    } else if v < skyline {
        0.75
    } else {
        (0.05 + (1.0 - v) * 0.3).clamp(0.0, 1.0)
    }
}

fn shade(brightness: f32) -> char {
    let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyplanet_core::{PlanetConfig, ProjectionMode, ProjectionStrategy, Transform};

    #[test]
    fn test_barycentric_corners() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (0.0, 0.0)).unwrap();
        assert!((w0 - 1.0).abs() < 1e-6 && w1.abs() < 1e-6 && w2.abs() < 1e-6);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }

    #[test]
    fn test_sample_panorama_range() {
        for i in 0..=20 {
            for j in 0..=20 {
                let b = sample_panorama(i as f32 / 20.0, j as f32 / 20.0);
                assert!((0.0..=1.0).contains(&b));
            }
        }
    }

    #[test]
    fn test_unwrap_seam() {
        let vertex = |u| ScreenVertex {
            x: 0.0,
            y: 0.0,
            depth: 0.0,
            uv: [u, 0.5],
        };
        let mut tri = [vertex(0.95), vertex(0.02), vertex(0.97)];
        unwrap_seam(&mut tri);
        assert!((tri[1].uv[0] - 1.02).abs() < 1e-6);
        assert_eq!(tri[0].uv[0], 0.95);
    }

    #[test]
    fn test_tiny_planet_fills_center() {
        let camera = Camera::new(40, 20);
        let mut strategy = ProjectionMode::TinyPlanet
            .create(&PlanetConfig::default(), &camera)
            .unwrap();
        let mvp = Transform::mvp_matrix(
            &strategy.model_matrix(),
            &strategy.view_matrix(&camera),
            &strategy.projection_matrix(&camera).unwrap(),
        );

        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.render_mesh(strategy.mesh().unwrap(), &mvp);
        assert_ne!(renderer.char_at(20, 10), ' ');

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        assert!(!out.is_empty());
    }
}
