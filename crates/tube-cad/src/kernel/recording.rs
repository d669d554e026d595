//! Recording CAD Kernel
//!
//! An in-memory kernel that validates its inputs, hands out solid handles and
//! records every call in order. It carries no geometry, which makes it the
//! dry-run backend and the test double for code that drives a kernel.

use glam::Vec3;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{BooleanType, CadError, CadKernel, CadResult, Solid, Wire2D};

/// A single call accepted by the [`RecordingKernel`]
#[derive(Debug, Clone, PartialEq)]
pub enum KernelCall {
    /// A profile was extruded into a new solid
    Extrude {
        /// Solid produced by the call
        solid: Uuid,
        /// Number of profile points
        point_count: usize,
        /// Sketch plane origin
        plane_origin: Vec3,
        /// Extrusion direction
        direction: Vec3,
        /// Extrusion distance
        distance: f32,
    },
    /// Two solids were combined
    Boolean {
        /// Solid produced by the call
        solid: Uuid,
        /// Target (first) operand
        target: Uuid,
        /// Tool (second) operand
        tool: Uuid,
        /// Operation applied
        op: BooleanType,
    },
}

impl KernelCall {
    /// Solid produced by this call
    pub fn solid(&self) -> Uuid {
        match self {
            KernelCall::Extrude { solid, .. } => *solid,
            KernelCall::Boolean { solid, .. } => *solid,
        }
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<KernelCall>,
    solids: HashSet<Uuid>,
    attempts: usize,
}

/// Kernel that records calls instead of building geometry
#[derive(Debug, Default)]
pub struct RecordingKernel {
    state: Mutex<RecordingState>,
    /// Zero-based attempt index that is rejected, if any
    fail_at: Option<usize>,
}

impl RecordingKernel {
    /// Create a new recording kernel
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `index`-th call (zero-based) with an operation failure
    pub fn failing_at(index: usize) -> Self {
        Self {
            state: Mutex::new(RecordingState::default()),
            fail_at: Some(index),
        }
    }

    /// All accepted calls, in order
    pub fn calls(&self) -> Vec<KernelCall> {
        self.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Number of accepted calls
    pub fn call_count(&self) -> usize {
        self.lock().map(|s| s.calls.len()).unwrap_or(0)
    }

    /// Number of solids issued and not yet released
    pub fn live_solid_count(&self) -> usize {
        self.lock().map(|s| s.solids.len()).unwrap_or(0)
    }

    /// Whether `solid` was issued by this kernel and is still held
    pub fn holds(&self, solid: &Solid) -> bool {
        self.lock()
            .map(|s| s.solids.contains(&solid.id))
            .unwrap_or(false)
    }

    /// Number of calls attempted, including rejected ones
    pub fn attempt_count(&self) -> usize {
        self.lock().map(|s| s.attempts).unwrap_or(0)
    }

    fn lock(&self) -> CadResult<MutexGuard<'_, RecordingState>> {
        self.state
            .lock()
            .map_err(|_| CadError::OperationFailed("Recording kernel state poisoned".into()))
    }

    /// Count an attempt and apply the configured failure
    fn begin(&self, state: &mut RecordingState, what: &str) -> CadResult<()> {
        let attempt = state.attempts;
        state.attempts += 1;
        if self.fail_at == Some(attempt) {
            return Err(CadError::OperationFailed(format!(
                "{} rejected at call {}",
                what, attempt
            )));
        }
        Ok(())
    }

    fn issue(state: &mut RecordingState, call: KernelCall) -> Solid {
        let id = call.solid();
        state.solids.insert(id);
        state.calls.push(call);
        Solid::new(id).with_kernel_data()
    }
}

impl CadKernel for RecordingKernel {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extrude(
        &self,
        profile: &Wire2D,
        plane_origin: Vec3,
        _plane_x_axis: Vec3,
        _plane_y_axis: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> CadResult<Solid> {
        let mut state = self.lock()?;
        self.begin(&mut state, "Extrude")?;

        profile.validate()?;
        if !(distance > 0.0) || !distance.is_finite() {
            return Err(CadError::OperationFailed(format!(
                "Extrusion distance must be positive, got {}",
                distance
            )));
        }
        if direction.length_squared() <= f32::EPSILON {
            return Err(CadError::OperationFailed(
                "Extrusion direction is zero".into(),
            ));
        }

        Ok(Self::issue(
            &mut state,
            KernelCall::Extrude {
                solid: Uuid::new_v4(),
                point_count: profile.points.len(),
                plane_origin,
                direction,
                distance,
            },
        ))
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid> {
        let mut state = self.lock()?;
        self.begin(&mut state, "Boolean")?;

        for solid in [a, b] {
            if !solid.has_kernel_data() || !state.solids.contains(&solid.id) {
                return Err(CadError::SolidNotFound(solid.id));
            }
        }
        if a.id == b.id {
            return Err(CadError::BooleanFailed(
                "Target and tool are the same solid".into(),
            ));
        }

        Ok(Self::issue(
            &mut state,
            KernelCall::Boolean {
                solid: Uuid::new_v4(),
                target: a.id,
                tool: b.id,
                op,
            },
        ))
    }

    fn release(&self, solid: &Solid) -> CadResult<()> {
        self.lock()?.solids.remove(&solid.id);
        Ok(())
    }
}
