/// Text configuration for a tiny planet view, e.g.
/// `mode=crop texture=3840x1920 plane=1x1 rotation=0,0,0`
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, char, multispace0, multispace1},
    combinator::{all_consuming, map, value},
    multi::separated_list0,
    number::complete::float,
    sequence::{delimited, separated_pair, tuple},
    IResult,
};

use crate::error::{PlanetError, Result};
use crate::scale::{ScaleMode, TextureSize};
use crate::transform::RotationState;

#[derive(Debug, Clone, PartialEq)]
pub struct PlanetConfig {
    pub mode: ScaleMode,
    pub texture_size: TextureSize,
    pub plane_size: TextureSize,
    pub rotation: RotationState,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            mode: ScaleMode::Fit,
            texture_size: TextureSize::panorama_4k(),
            plane_size: TextureSize::unit(),
            rotation: RotationState::zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Setting {
    Mode(ScaleMode),
    Texture(f32, f32),
    Plane(f32, f32),
    Rotation(f32, f32, f32),
}

impl Setting {
    fn key(&self) -> &'static str {
        match self {
            Setting::Mode(_) => "mode",
            Setting::Texture(..) => "texture",
            Setting::Plane(..) => "plane",
            Setting::Rotation(..) => "rotation",
        }
    }
}

impl PlanetConfig {
    /// Parse whitespace separated `key=value` settings over the defaults
    pub fn parse(input: &str) -> Result<Self> {
        let settings = match parse_settings(input) {
            Ok((_, settings)) => settings,
            Err(e) => {
                return Err(PlanetError::Config(format!(
                    "invalid settings {input:?}: {e:?}"
                )))
            }
        };

        let mut config = Self::default();
        let mut seen: Vec<&'static str> = Vec::with_capacity(settings.len());
        for setting in settings {
            let key = setting.key();
            if seen.contains(&key) {
                return Err(PlanetError::Config(format!("duplicate key {key:?}")));
            }
            seen.push(key);

            match setting {
                Setting::Mode(mode) => config.mode = mode,
                Setting::Texture(w, h) => config.texture_size = TextureSize::new(w, h)?,
                Setting::Plane(w, h) => config.plane_size = TextureSize::new(w, h)?,
                Setting::Rotation(x, y, z) => config.rotation = RotationState::new(x, y, z),
            }
        }

        Ok(config)
    }
}

impl std::str::FromStr for PlanetConfig {
    type Err = PlanetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_settings(input: &str) -> IResult<&str, Vec<Setting>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, parse_setting),
        multispace0,
    ))(input)
}

fn parse_setting(input: &str) -> IResult<&str, Setting> {
    alt((
        map(
            separated_pair(tag("mode"), char('='), parse_mode),
            |(_, mode)| Setting::Mode(mode),
        ),
        map(
            separated_pair(tag("texture"), char('='), parse_size),
            |(_, (w, h))| Setting::Texture(w, h),
        ),
        map(
            separated_pair(tag("plane"), char('='), parse_size),
            |(_, (w, h))| Setting::Plane(w, h),
        ),
        map(
            separated_pair(tag("rotation"), char('='), parse_rotation),
            |(_, (x, y, z))| Setting::Rotation(x, y, z),
        ),
    ))(input)
}

fn parse_mode(input: &str) -> IResult<&str, ScaleMode> {
    let (rest, word) = alpha1(input)?;
    let parsed: IResult<&str, ScaleMode> = alt((
        value(ScaleMode::Full, all_consuming(tag("full"))),
        value(ScaleMode::Crop, all_consuming(tag("crop"))),
        value(ScaleMode::Fit, all_consuming(tag("fit"))),
    ))(word);
    let (_, mode) = parsed?;
    Ok((rest, mode))
}

fn parse_size(input: &str) -> IResult<&str, (f32, f32)> {
    separated_pair(float, char('x'), float)(input)
}

fn parse_rotation(input: &str) -> IResult<&str, (f32, f32, f32)> {
    map(
        tuple((float, char(','), float, char(','), float)),
        |(x, _, y, _, z)| (x, y, z),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config =
            PlanetConfig::parse("mode=crop texture=1920x1080 plane=2x1.5 rotation=0,90,-45")
                .unwrap();
        assert_eq!(config.mode, ScaleMode::Crop);
        assert_eq!(config.texture_size, TextureSize::new(1920.0, 1080.0).unwrap());
        assert_eq!(config.plane_size, TextureSize::new(2.0, 1.5).unwrap());
        assert_eq!(config.rotation, RotationState::new(0.0, 90.0, -45.0));
    }

    #[test]
    fn test_defaults_and_order() {
        assert_eq!(PlanetConfig::parse("").unwrap(), PlanetConfig::default());
        assert_eq!(PlanetConfig::parse("   ").unwrap(), PlanetConfig::default());

        let config: PlanetConfig = " texture=100x50   mode=full ".parse().unwrap();
        assert_eq!(config.mode, ScaleMode::Full);
        assert_eq!(config.texture_size.ratio(), 2.0);
        assert_eq!(config.plane_size, TextureSize::unit());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(PlanetConfig::parse("mode=zoom").is_err());
        assert!(PlanetConfig::parse("mode=fitted").is_err());
        assert!(PlanetConfig::parse("texture=100").is_err());
        assert!(PlanetConfig::parse("colour=red").is_err());
        assert!(PlanetConfig::parse("mode=fit mode=crop").is_err());
        assert!(PlanetConfig::parse("mode=fit trailing").is_err());
        assert!(matches!(
            PlanetConfig::parse("texture=0x100"),
            Err(PlanetError::InvalidAspectRatio { .. })
        ));
    }
}
