//! Holder generation
//!
//! Turns a validated [`HolderConfig`] into modeling directives against a
//! [`Design`]: one base extrusion, then for each slot a tube extrusion
//! followed by a groove cut into the tube top.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tube_cad::{
    CadKernel, Design, ExtrudeDirection, ExtrudeFeature, FeatureError, Sketch, SketchPlane,
};
use uuid::Uuid;

use crate::constants::{BASE_SKETCH_NAME, COMPONENT_NAME};
use crate::error::{GeneratorError, GeneratorResult};
use crate::layout::{SlotPlacement, compute_slot_placements, slot_spacing};
use crate::params::{HolderConfig, HolderSpec, TubeSpec};

/// A generated tube and the slot it occupies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeBody {
    pub placement: SlotPlacement,
    /// Body holding the tube (with its groove once cut)
    pub body: Uuid,
}

/// Summary of a completed generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderModel {
    /// Component that owns every holder body
    pub component: Uuid,
    /// Body of the base plate
    pub base_body: Uuid,
    /// Tubes in slot order
    pub tubes: Vec<TubeBody>,
    /// Number of features applied during the run
    pub directive_count: usize,
}

/// Sketch the base rectangle and extrude it as a new body
///
/// On a kernel failure the base sketch is removed again.
pub fn emit_holder_base(
    design: &mut Design,
    kernel: &dyn CadKernel,
    component: Uuid,
    holder: &HolderSpec,
) -> GeneratorResult<Uuid> {
    holder.validate()?;

    let mut sketch = Sketch::new(BASE_SKETCH_NAME, SketchPlane::xy());
    sketch
        .add_rectangle(Vec2::ZERO, Vec2::new(holder.width, holder.length))
        .map_err(FeatureError::from)?;

    let body = all_or_nothing(design, kernel, |design| {
        let sketch_id = design.add_sketch(sketch);
        let feature = ExtrudeFeature::new_body(
            "Holder Base",
            sketch_id,
            holder.height,
            ExtrudeDirection::Positive,
        );
        Ok(design.apply_feature(feature, component, kernel)?)
    })?;

    tracing::debug!(
        width = holder.width,
        length = holder.length,
        height = holder.height,
        "Base extruded"
    );
    Ok(body)
}

/// Extrude one tube at `placement` and cut its cap groove
///
/// Either both directives land or the design is left as it was.
pub fn emit_tube(
    design: &mut Design,
    kernel: &dyn CadKernel,
    component: Uuid,
    placement: &SlotPlacement,
    tube: &TubeSpec,
) -> GeneratorResult<TubeBody> {
    tube.validate()?;
    let number = placement.index + 1;

    let mut tube_sketch = Sketch::new(format!("Tube {} Sketch", number), SketchPlane::xy());
    tube_sketch
        .add_circle(placement.center(), tube.radius())
        .map_err(FeatureError::from)?;

    // The groove is sketched on the tube top and cut downwards
    let mut groove_sketch = Sketch::new(
        format!("Groove {} Sketch", number),
        SketchPlane::xy_offset(tube.height),
    );
    groove_sketch
        .add_circle(placement.center(), tube.groove_radius())
        .map_err(FeatureError::from)?;

    let body = all_or_nothing(design, kernel, |design| {
        let tube_sketch = design.add_sketch(tube_sketch);
        let body = design.apply_feature(
            ExtrudeFeature::new_body(
                format!("Tube {}", number),
                tube_sketch,
                tube.height,
                ExtrudeDirection::Positive,
            ),
            component,
            kernel,
        )?;

        let groove_sketch = design.add_sketch(groove_sketch);
        design.apply_feature(
            ExtrudeFeature::cut(
                format!("Groove {}", number),
                groove_sketch,
                tube.groove_depth,
                ExtrudeDirection::Negative,
                body,
            ),
            component,
            kernel,
        )?;
        Ok(body)
    })?;

    tracing::debug!(
        slot = placement.index,
        x = placement.center_x,
        y = placement.center_y,
        "Tube and groove created"
    );
    Ok(TubeBody {
        placement: *placement,
        body,
    })
}

/// Run `f` against `design`, restoring the design if it fails
fn all_or_nothing<T>(
    design: &mut Design,
    kernel: &dyn CadKernel,
    f: impl FnOnce(&mut Design) -> GeneratorResult<T>,
) -> GeneratorResult<T> {
    let checkpoint = design.checkpoint();
    let result = f(design);
    if result.is_err() {
        design.restore(checkpoint, kernel);
    }
    result
}

/// Generate a complete holder into `design`
///
/// Every parameter is validated before the design is touched. If the kernel
/// rejects a directive, the design is restored to its state before the run
/// and the kernel error is returned.
pub fn generate(
    config: &HolderConfig,
    design: &mut Design,
    kernel: &dyn CadKernel,
) -> GeneratorResult<HolderModel> {
    config.validate()?;
    let placements = compute_slot_placements(&config.holder, config.num_tubes)?;
    warn_on_tight_fit(config)?;

    tracing::info!(
        kernel = kernel.name(),
        num_tubes = config.num_tubes,
        "Generating tube holder"
    );

    let checkpoint = design.checkpoint();
    match build(config, &placements, design, kernel) {
        Ok(model) => {
            tracing::info!(
                directives = model.directive_count,
                bodies = model.tubes.len() + 1,
                "Tube holder generated"
            );
            Ok(model)
        }
        Err(e) => {
            tracing::error!(error = %e, "Tube holder generation failed, rolling back");
            design.restore(checkpoint, kernel);
            Err(e)
        }
    }
}

fn build(
    config: &HolderConfig,
    placements: &[SlotPlacement],
    design: &mut Design,
    kernel: &dyn CadKernel,
) -> GeneratorResult<HolderModel> {
    let start = design.len();
    let component = design.add_component(COMPONENT_NAME);

    let base_body = emit_holder_base(design, kernel, component, &config.holder)?;
    let tubes = placements
        .iter()
        .map(|placement| emit_tube(design, kernel, component, placement, &config.tube))
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    Ok(HolderModel {
        component,
        base_body,
        tubes,
        directive_count: design.len() - start,
    })
}

/// Valid but suspicious geometry: tubes wider than their slot or the plate
fn warn_on_tight_fit(config: &HolderConfig) -> GeneratorResult<()> {
    let spacing = slot_spacing(&config.holder, config.num_tubes)?;
    if config.tube.diameter > spacing {
        tracing::warn!(
            diameter = config.tube.diameter,
            spacing,
            "Tube diameter exceeds slot spacing, neighbouring tubes will overlap"
        );
    }
    if config.tube.diameter > config.holder.length {
        tracing::warn!(
            diameter = config.tube.diameter,
            length = config.holder.length,
            "Tube diameter exceeds holder length"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use approx::assert_relative_eq;
    use tube_cad::{BooleanType, FeatureOperation, KernelCall, RecordingKernel};

    #[test]
    fn test_reference_holder_issues_thirteen_directives() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        let model = generate(&HolderConfig::default(), &mut design, &kernel).unwrap();

        assert_eq!(model.directive_count, 13);
        assert_eq!(design.len(), 13);
        assert_eq!(model.tubes.len(), 6);

        let names: Vec<&str> = design.features().map(|f| f.name.as_str()).collect();
        let mut expected = vec!["Holder Base".to_string()];
        for n in 1..=6 {
            expected.push(format!("Tube {}", n));
            expected.push(format!("Groove {}", n));
        }
        assert_eq!(names, expected);

        let operations: Vec<FeatureOperation> = design.features().map(|f| f.operation).collect();
        assert_eq!(operations[0], FeatureOperation::NewBody);
        for pair in operations[1..].chunks(2) {
            assert_eq!(pair, [FeatureOperation::NewBody, FeatureOperation::Cut]);
        }
    }

    #[test]
    fn test_kernel_sees_base_then_tube_groove_pairs() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        let model = generate(&HolderConfig::default(), &mut design, &kernel).unwrap();

        // base extrude, then per tube: extrude, groove extrude, subtract
        let calls = kernel.calls();
        assert_eq!(calls.len(), 1 + 6 * 3);
        assert!(matches!(
            calls[0],
            KernelCall::Extrude { point_count: 4, distance, .. } if distance == 20.0
        ));
        for (i, tube) in model.tubes.iter().enumerate() {
            let at = 1 + i * 3;
            assert!(matches!(
                calls[at],
                KernelCall::Extrude { distance, plane_origin, .. }
                    if distance == 50.0 && plane_origin.z == 0.0
            ));
            assert!(matches!(
                calls[at + 1],
                KernelCall::Extrude { distance, plane_origin, direction, .. }
                    if distance == 2.0 && plane_origin.z == 50.0 && direction.z < 0.0
            ));
            assert!(matches!(
                calls[at + 2],
                KernelCall::Boolean { op: BooleanType::Subtract, target, .. }
                    if target == calls[at].solid()
            ));
            assert_eq!(tube.placement.index, i);
        }
    }

    #[test]
    fn test_sketch_geometry_matches_layout() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        let model = generate(&HolderConfig::default(), &mut design, &kernel).unwrap();

        let base = design.get(0).unwrap();
        let base_profiles = design
            .get_sketch(base.sketch_id)
            .unwrap()
            .extract_profiles()
            .unwrap();
        assert_eq!(base_profiles.len(), 1, "exactly one base profile");
        assert_relative_eq!(base_profiles[0].signed_area(), 8000.0);

        let last = model.tubes.last().unwrap();
        let groove = design.get(12).unwrap();
        let groove_sketch = design.get_sketch(groove.sketch_id).unwrap();
        assert_eq!(groove_sketch.plane, SketchPlane::xy_offset(50.0));
        let profile = &groove_sketch.extract_profiles().unwrap()[0];
        assert_relative_eq!(profile.centroid().x, last.placement.center_x, epsilon = 1e-3);
        assert_relative_eq!(profile.centroid().y, 40.0, epsilon = 1e-3);
        for p in &profile.points {
            assert_relative_eq!(p.distance(last.placement.center()), 6.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_bodies_are_grouped_in_holder_component() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        let model = generate(&HolderConfig::default(), &mut design, &kernel).unwrap();

        let component = design.component(model.component).unwrap();
        assert_eq!(component.name, COMPONENT_NAME);
        assert_eq!(component.parent, Some(design.root_component().id));
        assert_eq!(component.bodies.len(), 7);
        assert_eq!(component.bodies[0], model.base_body);
        for (tube, body) in model.tubes.iter().zip(&component.bodies[1..]) {
            assert_eq!(tube.body, *body);
        }
    }

    #[test]
    fn test_invalid_config_touches_nothing() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        let before = design.checkpoint();

        let wide_groove = HolderConfig {
            tube: TubeSpec::new(16.0, 50.0, 8.0, 2.0),
            ..HolderConfig::default()
        };
        let result = generate(&wide_groove, &mut design, &kernel);
        assert!(matches!(
            result,
            Err(GeneratorError::Configuration(ConfigError::GrooveTooWide { .. }))
        ));

        let no_tubes = HolderConfig {
            num_tubes: 0,
            ..HolderConfig::default()
        };
        assert!(matches!(
            generate(&no_tubes, &mut design, &kernel),
            Err(GeneratorError::Configuration(ConfigError::NoTubes))
        ));

        assert_eq!(kernel.attempt_count(), 0);
        assert_eq!(design.checkpoint(), before);
    }

    #[test]
    fn test_kernel_failure_rolls_back_the_run() {
        // Fail on the second tube's groove subtraction
        let kernel = RecordingKernel::failing_at(6);
        let mut design = Design::new("Holder");
        let before = design.checkpoint();

        let result = generate(&HolderConfig::default(), &mut design, &kernel);

        assert!(matches!(result, Err(GeneratorError::ModelingEngine(_))));
        assert_eq!(design.checkpoint(), before);
        assert!(design.bodies().is_empty());
        assert!(design.sketches().is_empty());
        assert_eq!(design.components().len(), 1);
        assert_eq!(kernel.attempt_count(), 7, "no directive after the failure");
        assert_eq!(kernel.live_solid_count(), 0);
    }

    #[test]
    fn test_reference_holder_keeps_one_solid_per_body() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        generate(&HolderConfig::default(), &mut design, &kernel).unwrap();

        // Groove tools are released; the uncut tube solids stay for rollback
        assert_eq!(kernel.call_count(), 19);
        assert_eq!(kernel.live_solid_count(), 13);
    }

    #[test]
    fn test_rollback_keeps_earlier_work() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        generate(&HolderConfig::default(), &mut design, &kernel).unwrap();
        let after_first = design.checkpoint();

        let failing = RecordingKernel::failing_at(0);
        assert!(generate(&HolderConfig::default(), &mut design, &failing).is_err());

        assert_eq!(design.checkpoint(), after_first);
        assert_eq!(design.len(), 13);
        assert_eq!(design.bodies().len(), 7);
    }

    #[test]
    fn test_emit_tube_rejects_degenerate_groove_up_front() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        let component = design.root_component().id;
        let placement = SlotPlacement {
            index: 0,
            center_x: 10.0,
            center_y: 10.0,
        };

        let result = emit_tube(
            &mut design,
            &kernel,
            component,
            &placement,
            &TubeSpec::new(16.0, 50.0, 8.0, 2.0),
        );
        assert!(matches!(result, Err(GeneratorError::Configuration(_))));
        assert!(design.sketches().is_empty());
        assert_eq!(kernel.attempt_count(), 0);
    }

    #[test]
    fn test_single_tube_holder() {
        let kernel = RecordingKernel::new();
        let mut design = Design::new("Holder");
        let config = HolderConfig {
            num_tubes: 1,
            holder: HolderSpec::new(30.0, 30.0, 5.0),
            ..HolderConfig::default()
        };

        let model = generate(&config, &mut design, &kernel).unwrap();
        assert_eq!(model.directive_count, 3);
        assert_eq!(model.tubes[0].placement.center(), Vec2::new(15.0, 15.0));
    }

    #[test]
    fn test_failed_base_leaves_no_sketch_behind() {
        let kernel = RecordingKernel::failing_at(0);
        let mut design = Design::new("Holder");
        let component = design.root_component().id;
        let before = design.checkpoint();

        let result = emit_holder_base(&mut design, &kernel, component, &HolderSpec::default());

        assert!(matches!(result, Err(GeneratorError::ModelingEngine(_))));
        assert_eq!(design.checkpoint(), before);
        assert!(design.sketches().is_empty());
        assert!(design.bodies().is_empty());
    }

    #[test]
    fn test_failed_groove_removes_its_tube() {
        let placement = SlotPlacement {
            index: 2,
            center_x: 41.667,
            center_y: 40.0,
        };

        // 1: groove extrusion rejected, 2: groove subtraction rejected
        for fail_at in [1, 2] {
            let kernel = RecordingKernel::failing_at(fail_at);
            let mut design = Design::new("Holder");
            let component = design.root_component().id;
            let before = design.checkpoint();

            let result = emit_tube(
                &mut design,
                &kernel,
                component,
                &placement,
                &TubeSpec::default(),
            );

            assert!(matches!(result, Err(GeneratorError::ModelingEngine(_))));
            assert_eq!(design.checkpoint(), before);
            assert!(design.sketches().is_empty());
            assert!(design.bodies().is_empty());
            assert!(design.root_component().bodies.is_empty());
            assert_eq!(kernel.live_solid_count(), 0);
        }
    }
}
