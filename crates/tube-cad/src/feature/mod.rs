//! Feature Operations
//!
//! Provides the extrude feature that turns a sketch profile into a 3D solid,
//! either as a new body or combined with an existing one.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::kernel::{BooleanType, CadKernel, Solid};
use crate::sketch::Sketch;

/// Feature-related errors
#[derive(Debug, Clone, Error)]
pub enum FeatureError {
    #[error("Sketch error: {0}")]
    SketchError(#[from] crate::sketch::SketchError),

    #[error("CAD kernel error: {0}")]
    CadError(#[from] crate::kernel::CadError),

    #[error("Invalid feature: {0}")]
    InvalidFeature(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(Uuid),
}

/// Result type for feature operations
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Direction for extrusion
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ExtrudeDirection {
    /// Extrude in the positive normal direction
    #[default]
    Positive,
    /// Extrude in the negative normal direction
    Negative,
}

/// How the extruded solid relates to existing bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureOperation {
    /// Create new body
    #[default]
    NewBody,
    /// Remove from existing body
    Cut,
}

impl From<FeatureOperation> for Option<BooleanType> {
    fn from(op: FeatureOperation) -> Self {
        match op {
            FeatureOperation::NewBody => None,
            FeatureOperation::Cut => Some(BooleanType::Subtract),
        }
    }
}

/// Extrude a sketch profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtrudeFeature {
    /// Unique identifier
    pub id: Uuid,
    /// Name of the feature
    pub name: String,
    /// Reference to the sketch
    pub sketch_id: Uuid,
    /// Extrusion distance
    pub distance: f32,
    /// Extrusion direction
    pub direction: ExtrudeDirection,
    /// Boolean operation with existing body
    pub operation: FeatureOperation,
    /// Target body ID (required for Cut)
    pub target_body: Option<Uuid>,
}

impl ExtrudeFeature {
    /// Create an extrude feature that produces a new body
    pub fn new_body(
        name: impl Into<String>,
        sketch_id: Uuid,
        distance: f32,
        direction: ExtrudeDirection,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sketch_id,
            distance,
            direction,
            operation: FeatureOperation::NewBody,
            target_body: None,
        }
    }

    /// Create an extrude feature that cuts into `target_body`
    pub fn cut(
        name: impl Into<String>,
        sketch_id: Uuid,
        distance: f32,
        direction: ExtrudeDirection,
        target_body: Uuid,
    ) -> Self {
        Self {
            operation: FeatureOperation::Cut,
            target_body: Some(target_body),
            ..Self::new_body(name, sketch_id, distance, direction)
        }
    }

    /// Get the type name of this feature
    pub fn type_name(&self) -> &'static str {
        match self.operation {
            FeatureOperation::NewBody => "Extrude",
            FeatureOperation::Cut => "Extrude (Cut)",
        }
    }

    /// Execute this feature to produce a solid
    ///
    /// For Cut the returned solid replaces the target body's solid, and the
    /// intermediate tool solid is released from the kernel.
    pub fn execute(
        &self,
        kernel: &dyn CadKernel,
        sketches: &HashMap<Uuid, Sketch>,
        existing_bodies: &HashMap<Uuid, Solid>,
    ) -> FeatureResult<Solid> {
        if !(self.distance > 0.0) {
            return Err(FeatureError::InvalidFeature(format!(
                "Extrusion distance must be positive, got {}",
                self.distance
            )));
        }

        let boolean = Option::<BooleanType>::from(self.operation);
        let target = match (boolean, self.target_body) {
            (None, _) => None,
            (Some(_), None) => {
                return Err(FeatureError::InvalidFeature(format!(
                    "{} requires a target body",
                    self.type_name()
                )));
            }
            (Some(_), Some(target_id)) => Some(existing_bodies.get(&target_id).ok_or(
                FeatureError::InvalidFeature(format!("Target body {} not found", target_id)),
            )?),
        };

        let sketch = sketches
            .get(&self.sketch_id)
            .ok_or(FeatureError::InvalidFeature(format!(
                "Sketch {} not found",
                self.sketch_id
            )))?;

        let profiles = sketch.extract_profiles()?;
        let Some(profile) = profiles.first() else {
            return Err(FeatureError::InvalidFeature(
                "No closed profiles found".into(),
            ));
        };

        let normal: Vec3 = sketch.plane.normal;
        let extrude_dir = match self.direction {
            ExtrudeDirection::Positive => normal,
            ExtrudeDirection::Negative => -normal,
        };

        let solid = kernel.extrude(
            profile,
            sketch.plane.origin,
            sketch.plane.x_axis,
            sketch.plane.y_axis,
            extrude_dir,
            self.distance,
        )?;

        let (Some(op), Some(target)) = (boolean, target) else {
            return Ok(solid);
        };

        // The tool only exists to be combined; drop it whatever the outcome
        let combined = kernel.boolean(target, &solid, op);
        kernel.release(&solid)?;
        Ok(combined?)
    }
}

/// A body produced by features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadBody {
    /// Unique identifier
    pub id: Uuid,
    /// Name of the body
    pub name: String,
    /// The solid geometry (not serialized)
    #[serde(skip)]
    pub solid: Option<Solid>,
    /// Feature that created this body
    pub source_feature: Option<Uuid>,
    /// Component that owns this body
    pub component: Uuid,
}

impl CadBody {
    /// Create a new body with the given name inside a component
    pub fn new(name: impl Into<String>, component: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            solid: None,
            source_feature: None,
            component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{KernelCall, RecordingKernel};
    use crate::sketch::SketchPlane;
    use glam::Vec2;

    fn sketches_with(sketch: Sketch) -> HashMap<Uuid, Sketch> {
        let mut map = HashMap::new();
        map.insert(sketch.id, sketch);
        map
    }

    #[test]
    fn test_new_body_extrudes_along_normal() {
        let mut sketch = Sketch::new("Base", SketchPlane::xy());
        sketch.add_rectangle(Vec2::ZERO, Vec2::new(10.0, 5.0)).unwrap();
        let feature =
            ExtrudeFeature::new_body("Base", sketch.id, 20.0, ExtrudeDirection::Positive);
        let sketches = sketches_with(sketch);
        let kernel = RecordingKernel::new();

        feature.execute(&kernel, &sketches, &HashMap::new()).unwrap();

        let calls = kernel.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            calls[0],
            KernelCall::Extrude { direction, distance, point_count: 4, .. }
                if direction == Vec3::Z && distance == 20.0
        ));
    }

    #[test]
    fn test_cut_subtracts_from_target() {
        let kernel = RecordingKernel::new();
        let mut base = Sketch::new("Tube", SketchPlane::xy());
        base.add_circle(Vec2::ZERO, 8.0).unwrap();
        let mut top = Sketch::new("Groove", SketchPlane::xy_offset(50.0));
        top.add_circle(Vec2::ZERO, 6.0).unwrap();

        let mut sketches = sketches_with(base.clone());
        sketches.insert(top.id, top.clone());

        let tube = ExtrudeFeature::new_body("Tube", base.id, 50.0, ExtrudeDirection::Positive)
            .execute(&kernel, &sketches, &HashMap::new())
            .unwrap();
        let tube_body = Uuid::new_v4();
        let mut bodies = HashMap::new();
        bodies.insert(tube_body, tube.clone());

        let cut = ExtrudeFeature::cut("Groove", top.id, 2.0, ExtrudeDirection::Negative, tube_body);
        let result = cut.execute(&kernel, &sketches, &bodies).unwrap();

        let calls = kernel.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(
            calls[1],
            KernelCall::Extrude { direction, plane_origin, .. }
                if direction == -Vec3::Z && plane_origin.z == 50.0
        ));
        assert!(matches!(
            calls[2],
            KernelCall::Boolean { target, op: BooleanType::Subtract, solid, .. }
                if target == tube.id && solid == result.id
        ));

        // The groove tool is gone; the tube and the cut result remain
        assert_eq!(kernel.live_solid_count(), 2);
        assert!(!kernel.holds(&Solid::new(calls[1].solid())));
        assert!(kernel.holds(&tube));
    }

    #[test]
    fn test_cut_without_target_is_invalid() {
        let mut sketch = Sketch::new("Groove", SketchPlane::xy());
        sketch.add_circle(Vec2::ZERO, 6.0).unwrap();
        let mut feature =
            ExtrudeFeature::cut("Groove", sketch.id, 2.0, ExtrudeDirection::Negative, Uuid::new_v4());
        let sketches = sketches_with(sketch);
        let kernel = RecordingKernel::new();

        assert!(matches!(
            feature.execute(&kernel, &sketches, &HashMap::new()),
            Err(FeatureError::InvalidFeature(_))
        ));

        feature.target_body = None;
        assert!(feature.execute(&kernel, &sketches, &HashMap::new()).is_err());
        assert_eq!(kernel.attempt_count(), 0);
    }

    #[test]
    fn test_empty_sketch_has_no_profile() {
        let sketch = Sketch::new("Empty", SketchPlane::xy());
        let feature = ExtrudeFeature::new_body("X", sketch.id, 1.0, ExtrudeDirection::Positive);
        let sketches = sketches_with(sketch);

        let result = feature.execute(&RecordingKernel::new(), &sketches, &HashMap::new());
        assert!(matches!(result, Err(FeatureError::InvalidFeature(_))));
    }
}
