//! Components
//!
//! Named containers that group bodies. Every design has one root component;
//! further components hang off it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A body container in a design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Parent component (None for the root)
    pub parent: Option<Uuid>,
    /// Bodies owned by this component, in creation order
    pub bodies: Vec<Uuid>,
}

impl Component {
    /// Create an empty component
    pub fn new(name: impl Into<String>, parent: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            parent,
            bodies: Vec::new(),
        }
    }

    /// Check whether this is a root component
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
