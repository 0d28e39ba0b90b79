//! Central error handling for the lens flare model
//!
//! Every configuration problem is surfaced as a `FlareError` at construction or
//! recompute time. Numeric domain issues are prevented by clamping and never
//! reach this type.

/// Centralized error type for all prepare-stage operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FlareError {
    #[error("interface {index}: curved surface requires a non-zero, finite curvature radius")]
    ZeroCurvatureRadius { index: usize },

    #[error("interface {index}: refractive index {value} must be finite and >= 1")]
    InvalidRefractiveIndex { index: usize, value: f64 },

    #[error("interface {index}: distance to next surface {value} must be finite and >= 0")]
    InvalidDistance { index: usize, value: f64 },

    #[error("resolution {0} is not a power of two")]
    NonPowerOfTwoResolution(usize),

    #[error("grid of {len} values does not form a {resolution}x{resolution} image")]
    GridSizeMismatch { resolution: usize, len: usize },

    #[error("Config error: {0}")]
    Config(String),
}

impl FlareError {
    /// Convenience constructor for free-form configuration errors
    pub fn config<T: ToString>(msg: T) -> Self {
        FlareError::Config(msg.to_string())
    }

    /// Short category label used in diagnostics
    pub fn category(&self) -> &'static str {
        match self {
            FlareError::ZeroCurvatureRadius { .. }
            | FlareError::InvalidRefractiveIndex { .. }
            | FlareError::InvalidDistance { .. } => "Lens",
            FlareError::NonPowerOfTwoResolution(_) | FlareError::GridSizeMismatch { .. } => {
                "Aperture"
            }
            FlareError::Config(_) => "Config",
        }
    }
}

/// Result type alias for lens flare operations
pub type FlareResult<T> = Result<T, FlareError>;
