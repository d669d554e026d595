//! Error types for the tube holder generator

use thiserror::Error;
use tube_cad::FeatureError;

/// Invalid input parameters, detected before any modeling directive
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Number of tubes must be at least 1")]
    NoTubes,

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("Groove width {groove_width} leaves no groove in a tube of diameter {diameter}")]
    GrooveTooWide { groove_width: f32, diameter: f32 },

    #[error("Groove depth {groove_depth} must be less than tube height {tube_height}")]
    GrooveTooDeep { groove_depth: f32, tube_height: f32 },

    #[error("Invalid configuration: {0}")]
    Parse(String),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

/// Errors raised while generating a holder
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Modeling engine error: {0}")]
    ModelingEngine(#[from] FeatureError),
}

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;
