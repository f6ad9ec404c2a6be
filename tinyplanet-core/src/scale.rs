/// Plane scale calculation for fitting a texture into the viewport
use log::warn;

use crate::error::{ensure_positive, Result};

const BASE_VALUE: f32 = 1.0;

/// Policy for placing a texture whose aspect differs from the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Stretch to the viewport, texture assumed to be pre-fit
    Full,
    /// Cover the viewport, cropping whichever texture side overflows
    Crop,
    /// Show the whole texture, leaving pillar/letter boxes
    #[default]
    Fit,
}

impl ScaleMode {
    pub const CODE_FIT: i32 = 207;
    pub const CODE_CROP: i32 = 208;
    pub const CODE_FULL: i32 = 209;

    /// Map a host library mode code. Unknown codes behave like `Fit`.
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::CODE_FULL => ScaleMode::Full,
            Self::CODE_CROP => ScaleMode::Crop,
            Self::CODE_FIT => ScaleMode::Fit,
            other => {
                warn!("unknown scale mode code {other}, falling back to fit");
                ScaleMode::Fit
            }
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ScaleMode::Full => Self::CODE_FULL,
            ScaleMode::Crop => Self::CODE_CROP,
            ScaleMode::Fit => Self::CODE_FIT,
        }
    }
}

/// Width and height of a rectangle (source texture or mesh plane).
///
/// Both sides are always finite and positive; `new` is the only way to
/// build one from arbitrary values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSize {
    width: f32,
    height: f32,
}

impl TextureSize {
    /// Build a size, rejecting non-positive or non-finite sides
    pub fn new(width: f32, height: f32) -> Result<Self> {
        Ok(Self {
            width: ensure_positive("width", width)?,
            height: ensure_positive("height", height)?,
        })
    }

    pub fn unit() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }

    /// 2:1 equirectangular frame, the usual 4K panorama
    pub fn panorama_4k() -> Self {
        Self {
            width: 3840.0,
            height: 1920.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Viewport and texture extents relative to a unit base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectExtents {
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub texture_width: f32,
    pub texture_height: f32,
}

impl Default for AspectExtents {
    fn default() -> Self {
        Self {
            viewport_width: BASE_VALUE,
            viewport_height: BASE_VALUE,
            texture_width: BASE_VALUE,
            texture_height: BASE_VALUE,
        }
    }
}

impl AspectExtents {
    /// Pure extent computation for a mode and a pair of ratios.
    ///
    /// Ratios are not validated here; zero or infinite input propagates
    /// into the extents. `ScaleCalculator` guards its inputs instead.
    pub fn compute(mode: ScaleMode, texture_ratio: f32, viewport_ratio: f32) -> Self {
        match mode {
            ScaleMode::Full => Self::default(),
            ScaleMode::Crop => {
                if texture_ratio > viewport_ratio {
                    // crop texture width
                    Self::height_matched(texture_ratio, viewport_ratio)
                } else {
                    // crop texture height
                    Self::width_matched(texture_ratio, viewport_ratio)
                }
            }
            ScaleMode::Fit => {
                if viewport_ratio > texture_ratio {
                    // pillarbox
                    Self::height_matched(texture_ratio, viewport_ratio)
                } else {
                    // letterbox
                    Self::width_matched(texture_ratio, viewport_ratio)
                }
            }
        }
    }

    fn height_matched(texture_ratio: f32, viewport_ratio: f32) -> Self {
        Self {
            viewport_width: BASE_VALUE * viewport_ratio,
            viewport_height: BASE_VALUE,
            texture_width: BASE_VALUE * texture_ratio,
            texture_height: BASE_VALUE,
        }
    }

    fn width_matched(texture_ratio: f32, viewport_ratio: f32) -> Self {
        Self {
            viewport_width: BASE_VALUE,
            viewport_height: BASE_VALUE / viewport_ratio,
            texture_width: BASE_VALUE,
            texture_height: BASE_VALUE / texture_ratio,
        }
    }
}

/// Derives plane and frustum extents from the scale mode, the texture
/// size and the latest viewport ratio
#[derive(Debug, Clone)]
pub struct ScaleCalculator {
    mode: ScaleMode,
    texture_size: TextureSize,
    viewport_ratio: f32,
    extents: AspectExtents,
}

impl ScaleCalculator {
    pub fn new(mode: ScaleMode, texture_size: TextureSize) -> Self {
        Self {
            mode,
            texture_size,
            viewport_ratio: BASE_VALUE,
            extents: AspectExtents::default(),
        }
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn texture_size(&self) -> TextureSize {
        self.texture_size
    }

    /// Depends only on the stored texture size, never on `calculate`
    pub fn texture_ratio(&self) -> f32 {
        self.texture_size.ratio()
    }

    pub fn viewport_ratio(&self) -> f32 {
        self.viewport_ratio
    }

    pub fn set_viewport_ratio(&mut self, viewport_ratio: f32) -> Result<()> {
        self.viewport_ratio = ensure_positive("viewport ratio", viewport_ratio)?;
        Ok(())
    }

    /// Swap the source texture, e.g. when a stream with a new aspect is loaded
    pub fn set_texture_size(&mut self, texture_size: TextureSize) {
        self.texture_size = texture_size;
    }

    /// Recompute all four extents from the current inputs
    pub fn calculate(&mut self) -> AspectExtents {
        self.extents = AspectExtents::compute(self.mode, self.texture_ratio(), self.viewport_ratio);
        self.extents
    }

    /// Extents from the last `calculate` call
    pub fn extents(&self) -> AspectExtents {
        self.extents
    }

    pub fn viewport_width(&self) -> f32 {
        self.extents.viewport_width
    }

    pub fn viewport_height(&self) -> f32 {
        self.extents.viewport_height
    }

    pub fn texture_width(&self) -> f32 {
        self.extents.texture_width
    }

    pub fn texture_height(&self) -> f32 {
        self.extents.texture_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATIOS: &[f32] = &[0.25, 0.5, 0.75, 1.0, 4.0 / 3.0, 16.0 / 9.0, 2.0, 3.5];

    fn calculator(mode: ScaleMode, texture_ratio: f32, viewport_ratio: f32) -> ScaleCalculator {
        let size = TextureSize::new(texture_ratio * 100.0, 100.0).unwrap();
        let mut calc = ScaleCalculator::new(mode, size);
        calc.set_viewport_ratio(viewport_ratio).unwrap();
        calc.calculate();
        calc
    }

    #[test]
    fn test_full_always_unit() {
        for &t in RATIOS {
            for &v in RATIOS {
                let e = calculator(ScaleMode::Full, t, v).extents();
                assert_eq!(e, AspectExtents::default());
            }
        }
    }

    #[test]
    fn test_crop_covers_viewport() {
        for &t in RATIOS {
            for &v in RATIOS {
                let e = calculator(ScaleMode::Crop, t, v).extents();
                assert!((e.viewport_width / e.viewport_height - v).abs() < 1e-5);
                assert!(e.texture_width >= e.viewport_width - 1e-6);
                assert!(e.texture_height >= e.viewport_height - 1e-6);
            }
        }
    }

    #[test]
    fn test_fit_inside_viewport() {
        for &t in RATIOS {
            for &v in RATIOS {
                let e = calculator(ScaleMode::Fit, t, v).extents();
                assert!(e.texture_width <= e.viewport_width + 1e-6);
                assert!(e.texture_height <= e.viewport_height + 1e-6);
                assert!((e.texture_width / e.texture_height - t).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_fit_pillarbox_scenario() {
        let e = calculator(ScaleMode::Fit, 1.0, 2.0).extents();
        assert_eq!(e.viewport_width, 2.0);
        assert_eq!(e.viewport_height, 1.0);
        assert_eq!(e.texture_width, 1.0);
        assert_eq!(e.texture_height, 1.0);
    }

    #[test]
    fn test_crop_width_scenario() {
        let e = calculator(ScaleMode::Crop, 2.0, 1.0).extents();
        assert_eq!(e.viewport_width, 1.0);
        assert_eq!(e.viewport_height, 1.0);
        assert_eq!(e.texture_width, 2.0);
        assert_eq!(e.texture_height, 1.0);
    }

    #[test]
    fn test_fit_letterbox_branch() {
        let e = calculator(ScaleMode::Fit, 2.0, 1.0).extents();
        assert_eq!(e.viewport_width, 1.0);
        assert_eq!(e.viewport_height, 1.0);
        assert_eq!(e.texture_width, 1.0);
        assert_eq!(e.texture_height, 0.5);
    }

    #[test]
    fn test_texture_ratio_independent_of_calculate() {
        let mut calc = ScaleCalculator::new(
            ScaleMode::Crop,
            TextureSize::new(3840.0, 1920.0).unwrap(),
        );
        assert_eq!(calc.texture_ratio(), 2.0);
        calc.set_viewport_ratio(0.5).unwrap();
        calc.calculate();
        assert_eq!(calc.texture_ratio(), 2.0);
    }

    #[test]
    fn test_calculate_idempotent() {
        let mut calc = calculator(ScaleMode::Fit, 1.5, 0.8);
        let first = calc.extents();
        assert_eq!(calc.calculate(), first);
        assert_eq!(calc.calculate(), first);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let mut calc = ScaleCalculator::new(ScaleMode::Fit, TextureSize::unit());
        assert!(calc.set_viewport_ratio(0.0).is_err());
        assert!(calc.set_viewport_ratio(-1.0).is_err());
        assert!(calc.set_viewport_ratio(f32::INFINITY).is_err());
        assert_eq!(calc.viewport_ratio(), 1.0);
    }

    #[test]
    fn test_texture_size_always_positive() {
        let degenerate = [
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, -1.0),
            (f32::NAN, 1.0),
            (1.0, f32::INFINITY),
        ];
        for (w, h) in degenerate {
            assert!(TextureSize::new(w, h).is_err());
        }

        // every size a calculator can hold yields finite extents
        let sizes = [
            TextureSize::unit(),
            TextureSize::panorama_4k(),
            TextureSize::new(1e-3, 7.0).unwrap(),
        ];
        for size in sizes {
            let mut calc = ScaleCalculator::new(ScaleMode::Fit, size);
            calc.set_viewport_ratio(1.5).unwrap();
            let e = calc.calculate();
            assert!(calc.texture_ratio().is_finite() && calc.texture_ratio() > 0.0);
            assert!(e.texture_width.is_finite() && e.texture_height.is_finite());
        }
        assert_eq!(TextureSize::panorama_4k().width(), 3840.0);
        assert_eq!(TextureSize::panorama_4k().height(), 1920.0);
    }

    #[test]
    fn test_mode_codes() {
        assert_eq!(ScaleMode::from_code(209), ScaleMode::Full);
        assert_eq!(ScaleMode::from_code(208), ScaleMode::Crop);
        assert_eq!(ScaleMode::from_code(207), ScaleMode::Fit);
        assert_eq!(ScaleMode::from_code(42), ScaleMode::Fit);
        assert_eq!(ScaleMode::from_code(ScaleMode::Crop.code()), ScaleMode::Crop);
    }
}
