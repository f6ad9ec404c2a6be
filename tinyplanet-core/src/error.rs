/// Error type shared by every tinyplanet crate
use thiserror::Error;

/// Largest number of lattice points addressable by a 16-bit index buffer
pub const MAX_MESH_POINTS: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanetError {
    #[error("invalid {what}: {value} (must be finite and greater than zero)")]
    InvalidAspectRatio { what: &'static str, value: f32 },

    #[error("mesh has {points} points, 16-bit indices address at most {max}")]
    CapacityExceeded { points: usize, max: usize },

    #[error("tessellation grid needs at least one row and one column (got {rows}x{columns})")]
    EmptyGrid { rows: usize, columns: usize },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlanetError>;

/// Reject zero, negative, NaN and infinite values before they reach a ratio
pub fn ensure_positive(what: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlanetError::InvalidAspectRatio { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive("ratio", 1.5), Ok(1.5));
        assert!(ensure_positive("ratio", 0.0).is_err());
        assert!(ensure_positive("ratio", -2.0).is_err());
        assert!(ensure_positive("ratio", f32::INFINITY).is_err());
        assert!(ensure_positive("ratio", f32::NAN).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = PlanetError::CapacityExceeded {
            points: 90601,
            max: MAX_MESH_POINTS,
        };
        assert_eq!(
            err.to_string(),
            "mesh has 90601 points, 16-bit indices address at most 65536"
        );
    }
}
