//! Parametric tube holder generator
//!
//! Computes a single row of tube slots on a rectangular base plate and
//! drives a [`tube_cad`] design through the modeling directives that build
//! it: base plate, then a tube and a cap groove per slot.

pub mod constants;
pub mod error;
pub mod generator;
pub mod layout;
pub mod params;

pub use error::{ConfigError, GeneratorError, GeneratorResult};
pub use generator::{HolderModel, TubeBody, emit_holder_base, emit_tube, generate};
pub use layout::{SlotPlacement, compute_slot_placements, slot_spacing};
pub use params::{HolderConfig, HolderSpec, TubeSpec};
