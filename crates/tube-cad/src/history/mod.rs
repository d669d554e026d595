//! Design Document
//!
//! Holds the sketches, the ordered feature history, the bodies and the
//! component tree of a model. Features are applied immediately, the way an
//! interactive CAD host executes them, and a checkpoint can be restored to
//! undo everything applied after it.

use std::collections::HashMap;
use uuid::Uuid;

use crate::component::Component;
use crate::feature::{CadBody, ExtrudeFeature, FeatureError, FeatureOperation, FeatureResult};
use crate::kernel::{CadKernel, Solid};
use crate::sketch::Sketch;

/// An entry in the feature history
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The feature
    pub feature: ExtrudeFeature,
    /// Bodies created by this feature
    pub created_bodies: Vec<Uuid>,
    /// Bodies modified by this feature
    pub modified_bodies: Vec<Uuid>,
    /// Solids the modified bodies held before this feature
    replaced_solids: Vec<(Uuid, Option<Solid>)>,
}

impl HistoryEntry {
    /// Create a new history entry
    pub fn new(feature: ExtrudeFeature) -> Self {
        Self {
            feature,
            created_bodies: Vec::new(),
            modified_bodies: Vec::new(),
            replaced_solids: Vec::new(),
        }
    }
}

/// Marker of a design state that can be restored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignCheckpoint {
    entries: usize,
    sketches: usize,
    components: usize,
}

/// A CAD model: sketches, feature history, bodies and components
///
/// Bodies hold kernel handles, so a design lives only as long as the session
/// with its kernel and is never serialized.
#[derive(Debug, Clone)]
pub struct Design {
    /// Design name
    pub name: String,
    /// Ordered list of applied features
    entries: Vec<HistoryEntry>,
    /// All sketches in the model
    sketches: HashMap<Uuid, Sketch>,
    /// Sketch IDs in creation order
    sketch_order: Vec<Uuid>,
    /// Component tree, root first, in creation order
    components: Vec<Component>,
    /// All bodies in the model
    bodies: HashMap<Uuid, CadBody>,
}

impl Default for Design {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Design {
    /// Create an empty design with a root component
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            components: vec![Component::new(name.clone(), None)],
            name,
            entries: Vec::new(),
            sketches: HashMap::new(),
            sketch_order: Vec::new(),
            bodies: HashMap::new(),
        }
    }

    /// Get the number of applied features
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no feature has been applied
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a feature by index
    pub fn get(&self, index: usize) -> Option<&ExtrudeFeature> {
        self.entries.get(index).map(|e| &e.feature)
    }

    /// Get all features in application order
    pub fn features(&self) -> impl Iterator<Item = &ExtrudeFeature> {
        self.entries.iter().map(|e| &e.feature)
    }

    /// Get all history entries
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    // ============== Component Management ==============

    /// The root component
    pub fn root_component(&self) -> &Component {
        &self.components[0]
    }

    /// Add a component under the root and return its ID
    pub fn add_component(&mut self, name: impl Into<String>) -> Uuid {
        let component = Component::new(name, Some(self.root_component().id));
        let id = component.id;
        self.components.push(component);
        id
    }

    /// Get a component by ID
    pub fn component(&self, id: Uuid) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Get all components, root first
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    // ============== Sketch Management ==============

    /// Add a sketch
    pub fn add_sketch(&mut self, sketch: Sketch) -> Uuid {
        let id = sketch.id;
        if self.sketches.insert(id, sketch).is_none() {
            self.sketch_order.push(id);
        }
        id
    }

    /// Get a sketch by ID
    pub fn get_sketch(&self, id: Uuid) -> Option<&Sketch> {
        self.sketches.get(&id)
    }

    /// Get all sketches
    pub fn sketches(&self) -> &HashMap<Uuid, Sketch> {
        &self.sketches
    }

    // ============== Body Management ==============

    /// Get a body by ID
    pub fn get_body(&self, id: Uuid) -> Option<&CadBody> {
        self.bodies.get(&id)
    }

    /// Get all bodies
    pub fn bodies(&self) -> &HashMap<Uuid, CadBody> {
        &self.bodies
    }

    // ============== Features ==============

    /// Execute a feature and record it in the history
    ///
    /// A NewBody feature creates a body in `component`; a Cut replaces the
    /// target body's solid. Returns the ID of the created or modified
    /// body. A failing feature leaves the design unchanged.
    pub fn apply_feature(
        &mut self,
        feature: ExtrudeFeature,
        component: Uuid,
        kernel: &dyn CadKernel,
    ) -> FeatureResult<Uuid> {
        let component_index = self
            .components
            .iter()
            .position(|c| c.id == component)
            .ok_or(FeatureError::ComponentNotFound(component))?;

        let solids: HashMap<Uuid, Solid> = self
            .bodies
            .iter()
            .filter_map(|(id, body)| body.solid.clone().map(|s| (*id, s)))
            .collect();

        let solid = feature.execute(kernel, &self.sketches, &solids)?;
        let mut entry = HistoryEntry::new(feature);

        let body_id = match (entry.feature.operation, entry.feature.target_body) {
            (FeatureOperation::NewBody, _) => {
                let mut body = CadBody::new(entry.feature.name.clone(), component);
                body.source_feature = Some(entry.feature.id);
                body.solid = Some(solid);
                let body_id = body.id;

                self.bodies.insert(body_id, body);
                self.components[component_index].bodies.push(body_id);
                entry.created_bodies.push(body_id);
                body_id
            }
            (_, Some(target_id)) => {
                let body = self
                    .bodies
                    .get_mut(&target_id)
                    .ok_or(FeatureError::InvalidFeature(format!(
                        "Target body {} not found",
                        target_id
                    )))?;
                let previous = body.solid.replace(solid);
                entry.replaced_solids.push((target_id, previous));
                entry.modified_bodies.push(target_id);
                target_id
            }
            (_, None) => {
                return Err(FeatureError::InvalidFeature(
                    "Cut feature without target body".into(),
                ));
            }
        };

        tracing::debug!(
            feature = %entry.feature.name,
            kind = entry.feature.type_name(),
            body = %body_id,
            "Applied feature"
        );
        self.entries.push(entry);
        Ok(body_id)
    }

    // ============== Checkpoints ==============

    /// Capture the current state for a later [`Design::restore`]
    pub fn checkpoint(&self) -> DesignCheckpoint {
        DesignCheckpoint {
            entries: self.entries.len(),
            sketches: self.sketch_order.len(),
            components: self.components.len(),
        }
    }

    /// Undo every feature, sketch and component added after `checkpoint`
    ///
    /// Features are undone newest first: created bodies are removed and
    /// modified bodies get their previous solid back. Solids that no body
    /// references any more are released from `kernel`.
    pub fn restore(&mut self, checkpoint: DesignCheckpoint, kernel: &dyn CadKernel) {
        let mut orphaned = Vec::new();

        while self.entries.len() > checkpoint.entries {
            let Some(entry) = self.entries.pop() else {
                break;
            };
            for body_id in &entry.created_bodies {
                let Some(body) = self.bodies.remove(body_id) else {
                    continue;
                };
                if let Some(component) =
                    self.components.iter_mut().find(|c| c.id == body.component)
                {
                    component.bodies.retain(|id| id != body_id);
                }
                orphaned.extend(body.solid);
            }
            for (body_id, previous) in entry.replaced_solids {
                if let Some(body) = self.bodies.get_mut(&body_id) {
                    orphaned.extend(std::mem::replace(&mut body.solid, previous));
                }
            }
            tracing::debug!(feature = %entry.feature.name, "Rolled back feature");
        }

        for solid in &orphaned {
            if let Err(e) = kernel.release(solid) {
                tracing::warn!(solid = %solid.id, "Failed to release solid: {}", e);
            }
        }

        for id in self.sketch_order.drain(checkpoint.sketches.min(self.sketch_order.len())..) {
            self.sketches.remove(&id);
        }

        // The root component is never removed
        self.components.truncate(checkpoint.components.max(1));
    }
}
