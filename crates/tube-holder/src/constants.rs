//! Reference dimensions of the tube holder, in millimetres

/// Base plate width (X)
pub const DEFAULT_HOLDER_WIDTH: f32 = 100.0;

/// Base plate length (Y)
pub const DEFAULT_HOLDER_LENGTH: f32 = 80.0;

/// Base plate height (Z)
pub const DEFAULT_HOLDER_HEIGHT: f32 = 20.0;

/// Number of tube slots
pub const DEFAULT_NUM_TUBES: usize = 6;

/// Outer tube diameter
pub const DEFAULT_TUBE_DIAMETER: f32 = 16.0;

/// Tube height measured from the base plane
pub const DEFAULT_TUBE_HEIGHT: f32 = 50.0;

/// Wall left between the groove and the tube's outer surface
pub const DEFAULT_GROOVE_WIDTH: f32 = 2.0;

/// Depth of the cap groove below the tube top
pub const DEFAULT_GROOVE_DEPTH: f32 = 2.0;

/// Name of the component that receives all holder bodies
pub const COMPONENT_NAME: &str = "Tube Holder";

/// Name of the sketch carrying the base rectangle
pub const BASE_SKETCH_NAME: &str = "Tube Holder Sketch";
