//! Holder parameters and validation

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    // NaN fails the comparison as well
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

/// Dimensions of the rectangular base plate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolderSpec {
    /// Extent along X, shared out between the slots
    pub width: f32,
    /// Extent along Y
    pub length: f32,
    /// Plate thickness along Z
    pub height: f32,
}

impl Default for HolderSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_HOLDER_WIDTH,
            length: DEFAULT_HOLDER_LENGTH,
            height: DEFAULT_HOLDER_HEIGHT,
        }
    }
}

impl HolderSpec {
    pub fn new(width: f32, length: f32, height: f32) -> Self {
        Self {
            width,
            length,
            height,
        }
    }

    /// Check that every dimension is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("holder width", self.width)?;
        require_positive("holder length", self.length)?;
        require_positive("holder height", self.height)
    }
}

/// Per-slot tube and cap groove dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeSpec {
    /// Outer diameter
    pub diameter: f32,
    /// Height from the base plane to the tube top
    pub height: f32,
    /// Wall between the groove and the outer surface
    pub groove_width: f32,
    /// Depth of the groove below the tube top
    pub groove_depth: f32,
}

impl Default for TubeSpec {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_TUBE_DIAMETER,
            height: DEFAULT_TUBE_HEIGHT,
            groove_width: DEFAULT_GROOVE_WIDTH,
            groove_depth: DEFAULT_GROOVE_DEPTH,
        }
    }
}

impl TubeSpec {
    pub fn new(diameter: f32, height: f32, groove_width: f32, groove_depth: f32) -> Self {
        Self {
            diameter,
            height,
            groove_width,
            groove_depth,
        }
    }

    /// Outer radius of the tube
    pub fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    /// Radius of the groove circle (may be non-positive for bad input)
    pub fn groove_radius(&self) -> f32 {
        self.radius() - self.groove_width
    }

    /// Check dimensions and that the groove fits inside the tube
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tube diameter", self.diameter)?;
        require_positive("tube height", self.height)?;
        require_positive("groove width", self.groove_width)?;
        require_positive("groove depth", self.groove_depth)?;

        if !(self.groove_radius() > 0.0) {
            return Err(ConfigError::GrooveTooWide {
                groove_width: self.groove_width,
                diameter: self.diameter,
            });
        }
        if self.groove_depth >= self.height {
            return Err(ConfigError::GrooveTooDeep {
                groove_depth: self.groove_depth,
                tube_height: self.height,
            });
        }
        Ok(())
    }
}

/// Full parameter set for one holder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolderConfig {
    /// Base plate
    pub holder: HolderSpec,
    /// Tube and groove, shared by every slot
    pub tube: TubeSpec,
    /// Number of slots in the single row
    pub num_tubes: usize,
}

impl Default for HolderConfig {
    fn default() -> Self {
        Self {
            holder: HolderSpec::default(),
            tube: TubeSpec::default(),
            num_tubes: DEFAULT_NUM_TUBES,
        }
    }
}

impl HolderConfig {
    pub fn new(holder: HolderSpec, tube: TubeSpec, num_tubes: usize) -> Self {
        Self {
            holder,
            tube,
            num_tubes,
        }
    }

    /// Validate every parameter; the first violation is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_tubes == 0 {
            return Err(ConfigError::NoTubes);
        }
        self.holder.validate()?;
        self.tube.validate()
    }

    /// Parse a configuration from RON; missing fields take the defaults
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        ron::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to pretty-printed RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}
