//! CAD kernel abstraction
//!
//! The [`CadKernel`] trait is the only path to geometry. Backends:
//! - [`RecordingKernel`]: in-memory, records calls (always built)
//! - `TruckKernel`: pure Rust B-Rep via truck (feature `truck`)

mod recording;
mod traits;
#[cfg(feature = "truck")]
mod truck;

pub use recording::{KernelCall, RecordingKernel};
pub use traits::*;
#[cfg(feature = "truck")]
pub use truck::TruckKernel;
