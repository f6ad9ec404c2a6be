/// Tiny Planet Web - WASM bindings for the tiny planet core
///
/// Exposes mesh buffers and the orthographic projection to JavaScript.
/// The host page owns the WebGL context and uploads the buffers itself.

use tinyplanet_core::{
    projection::to_gl_array, Camera, Eye, PlanetConfig, PlanetError, ProjectionStrategy,
    RotationState, ScaleCalculator, ScaleMode, TextureSize, TinyPlanetMesh, TinyPlanetProjection,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn to_js(err: PlanetError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct TinyPlanet {
    projection: TinyPlanetProjection,
    camera: Camera,
}

impl TinyPlanet {
    fn build(mut projection: TinyPlanetProjection, camera: Camera) -> Result<TinyPlanet, JsValue> {
        projection.load().map_err(to_js)?;
        Ok(TinyPlanet { projection, camera })
    }
}

#[wasm_bindgen]
impl TinyPlanet {
    /// Create from a host scale mode code and the source texture size
    #[wasm_bindgen(constructor)]
    pub fn new(
        scale_mode: i32,
        texture_width: f32,
        texture_height: f32,
    ) -> Result<TinyPlanet, JsValue> {
        let texture_size = TextureSize::new(texture_width, texture_height).map_err(to_js)?;
        let camera = Camera::default();
        let projection = TinyPlanetProjection::new(
            ScaleCalculator::new(ScaleMode::from_code(scale_mode), texture_size),
            TinyPlanetMesh::default(),
            RotationState::zero(),
            &camera,
        )
        .map_err(to_js)?;
        Self::build(projection, camera)
    }

    /// Create from a config string such as `mode=crop texture=3840x1920`
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: &str) -> Result<TinyPlanet, JsValue> {
        let config = PlanetConfig::parse(config).map_err(to_js)?;
        let camera = Camera::default();
        let projection = TinyPlanetProjection::from_config(&config, &camera).map_err(to_js)?;
        Self::build(projection, camera)
    }

    /// Viewport ratio (width / height)
    #[wasm_bindgen(js_name = setViewportRatio)]
    pub fn set_viewport_ratio(&mut self, ratio: f32) -> Result<(), JsValue> {
        self.camera.set_aspect(ratio).map_err(to_js)
    }

    /// Read the viewport ratio from a canvas element's CSS size
    #[wasm_bindgen(js_name = resizeToCanvas)]
    pub fn resize_to_canvas(&mut self, canvas_id: &str) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;

        let width = canvas.client_width().max(1) as f32;
        let height = canvas.client_height().max(1) as f32;
        self.set_viewport_ratio(width / height)
    }

    #[wasm_bindgen(js_name = setNear)]
    pub fn set_near(&mut self, near: f32) -> Result<(), JsValue> {
        self.camera.set_near(near).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setTextureSize)]
    pub fn set_texture_size(&mut self, width: f32, height: f32) -> Result<(), JsValue> {
        let size = TextureSize::new(width, height).map_err(to_js)?;
        self.projection.calculator_mut().set_texture_size(size);
        Ok(())
    }

    /// True when the vertex buffer changed and must be uploaded again
    #[wasm_bindgen(js_name = updateVertices)]
    pub fn update_vertices(&mut self) -> Result<bool, JsValue> {
        self.projection.update_mesh().map_err(to_js)
    }

    /// 16 floats, column-major
    #[wasm_bindgen(js_name = projectionMatrix)]
    pub fn projection_matrix(&mut self) -> Result<Vec<f32>, JsValue> {
        let matrix = self.projection.projection_matrix(&self.camera).map_err(to_js)?;
        Ok(to_gl_array(&matrix).to_vec())
    }

    #[wasm_bindgen(js_name = modelMatrix)]
    pub fn model_matrix(&self) -> Vec<f32> {
        to_gl_array(&self.projection.model_matrix()).to_vec()
    }

    pub fn vertices(&self) -> Vec<f32> {
        self.projection
            .mesh()
            .map(|m| m.vertices(Eye::Left).to_vec())
            .unwrap_or_default()
    }

    /// Identical for both eyes
    #[wasm_bindgen(js_name = texCoords)]
    pub fn tex_coords(&self) -> Vec<f32> {
        self.projection
            .mesh()
            .map(|m| m.tex_coords(Eye::Left).to_vec())
            .unwrap_or_default()
    }

    pub fn indices(&self) -> Vec<u16> {
        self.projection
            .mesh()
            .map(|m| m.indices.clone())
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.projection.planet().triangle_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_exposed() {
        let planet = TinyPlanet::new(ScaleMode::CODE_FIT, 3840.0, 1920.0).unwrap();
        assert_eq!(planet.vertices().len(), 201 * 101 * 3);
        assert_eq!(planet.tex_coords().len(), 201 * 101 * 2);
        assert_eq!(planet.indices().len(), 200 * 100 * 6);
        assert_eq!(planet.triangle_count(), 40000);
    }

    #[test]
    fn test_projection_and_dirty_flag() {
        let mut planet = TinyPlanet::from_config("mode=crop texture=100x100").unwrap();
        planet.set_viewport_ratio(2.0).unwrap();
        let matrix = planet.projection_matrix().unwrap();
        assert_eq!(matrix.len(), 16);
        // crop, viewport wider than texture: half extents 0.5 x 0.25
        assert!((matrix[0] - 2.0).abs() < 1e-5);
        assert!((matrix[5] - 4.0).abs() < 1e-5);

        assert!(!planet.update_vertices().unwrap());
        planet.set_texture_size(200.0, 100.0).unwrap();
        assert!(planet.update_vertices().unwrap());
    }
}
