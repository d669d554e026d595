//! Slot layout
//!
//! Slots form a single row along X: the plate width is split into equal
//! shares and each tube sits in the middle of its share, halfway along Y.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::HolderSpec;

/// Position of one tube slot on the base plate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotPlacement {
    /// Zero-based slot index, ascending along X
    pub index: usize,
    pub center_x: f32,
    pub center_y: f32,
}

impl SlotPlacement {
    /// Slot center in sketch coordinates
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }
}

/// Width of the share each slot gets
pub fn slot_spacing(holder: &HolderSpec, num_tubes: usize) -> Result<f32, ConfigError> {
    if num_tubes == 0 {
        return Err(ConfigError::NoTubes);
    }
    if !(holder.width > 0.0) || !holder.width.is_finite() {
        return Err(ConfigError::NonPositive {
            name: "holder width",
            value: holder.width,
        });
    }
    Ok(holder.width / num_tubes as f32)
}

/// Compute the placement of every slot, in ascending index order
pub fn compute_slot_placements(
    holder: &HolderSpec,
    num_tubes: usize,
) -> Result<Vec<SlotPlacement>, ConfigError> {
    slot_spacing(holder, num_tubes)?;
    if !(holder.length > 0.0) || !holder.length.is_finite() {
        return Err(ConfigError::NonPositive {
            name: "holder length",
            value: holder.length,
        });
    }

    // Positions are computed in f64 and rounded once, so large rows do not drift
    let spacing = f64::from(holder.width) / num_tubes as f64;
    let center_y = holder.length / 2.0;
    Ok((0..num_tubes)
        .map(|index| SlotPlacement {
            index,
            center_x: (index as f64 * spacing + spacing / 2.0) as f32,
            center_y,
        })
        .collect())
}
