//! CAD Kernel Binding and Design Model
//!
//! This crate provides:
//! - Abstract CAD kernel trait for extrusion and boolean operations
//! - 2D sketches with rectangle and circle curves, and profile extraction
//! - Extrude features that create a new body or cut into an existing one
//! - A design document with components, feature history and checkpoints

pub mod component;
pub mod feature;
pub mod history;
pub mod kernel;
pub mod sketch;

// Re-exports for convenience
pub use component::Component;
pub use feature::{
    CadBody, ExtrudeDirection, ExtrudeFeature, FeatureError, FeatureOperation, FeatureResult,
};
pub use history::{Design, DesignCheckpoint, HistoryEntry};
#[cfg(feature = "truck")]
pub use kernel::TruckKernel;
pub use kernel::{
    BooleanType, CadError, CadKernel, CadResult, KernelCall, NullKernel, RecordingKernel, Solid,
    Wire2D, default_kernel,
};
pub use sketch::{Sketch, SketchEntity, SketchError, SketchPlane, SketchResult};
