//! 2D Sketches
//!
//! A sketch is a set of construction curves on a plane. Closed curves
//! (circles, and line loops joined through shared points) become profiles
//! that features can extrude.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::kernel::Wire2D;

/// Number of segments used when turning a circle into a profile
pub const CIRCLE_SEGMENTS: u32 = 64;

/// Sketch-related errors
#[derive(Debug, Clone, Error)]
pub enum SketchError {
    #[error("Entity not found: {0}")]
    EntityNotFound(Uuid),

    #[error("Entity {0} is not a point")]
    NotAPoint(Uuid),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

/// Result type for sketch operations
pub type SketchResult<T> = Result<T, SketchError>;

/// Plane a sketch is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    /// Origin of the plane in world space
    pub origin: Vec3,
    /// Plane normal
    pub normal: Vec3,
    /// Local X axis
    pub x_axis: Vec3,
    /// Local Y axis
    pub y_axis: Vec3,
}

impl SketchPlane {
    /// The XY construction plane through the world origin
    pub fn xy() -> Self {
        Self::xy_offset(0.0)
    }

    /// A plane parallel to XY at height `z`
    pub fn xy_offset(z: f32) -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, z),
            normal: Vec3::Z,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
        }
    }

    /// Map a point in sketch coordinates to world space
    pub fn to_world(&self, point: Vec2) -> Vec3 {
        self.origin + self.x_axis * point.x + self.y_axis * point.y
    }
}

impl Default for SketchPlane {
    fn default() -> Self {
        Self::xy()
    }
}

/// A construction entity in a sketch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SketchEntity {
    /// A point
    Point {
        /// Unique identifier
        id: Uuid,
        /// Position in sketch coordinates
        position: Vec2,
    },

    /// A line segment between two points
    Line {
        /// Unique identifier
        id: Uuid,
        /// Start point ID
        start: Uuid,
        /// End point ID
        end: Uuid,
    },

    /// A full circle
    Circle {
        /// Unique identifier
        id: Uuid,
        /// Center point ID
        center: Uuid,
        /// Radius
        radius: f32,
    },
}

impl SketchEntity {
    /// Get the unique ID of this entity
    pub fn id(&self) -> Uuid {
        match self {
            SketchEntity::Point { id, .. } => *id,
            SketchEntity::Line { id, .. } => *id,
            SketchEntity::Circle { id, .. } => *id,
        }
    }

    /// Get the type name of this entity
    pub fn type_name(&self) -> &'static str {
        match self {
            SketchEntity::Point { .. } => "Point",
            SketchEntity::Line { .. } => "Line",
            SketchEntity::Circle { .. } => "Circle",
        }
    }
}

/// A 2D sketch on a plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sketch {
    /// Unique identifier
    pub id: Uuid,
    /// Name of the sketch
    pub name: String,
    /// Plane the sketch lives on
    pub plane: SketchPlane,
    /// Entities in insertion order
    entities: Vec<SketchEntity>,
}

impl Sketch {
    /// Create an empty sketch on a plane
    pub fn new(name: impl Into<String>, plane: SketchPlane) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            plane,
            entities: Vec::new(),
        }
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the sketch has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get an entity by ID
    pub fn get_entity(&self, id: Uuid) -> Option<&SketchEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Position of a point entity
    pub fn point_position(&self, id: Uuid) -> SketchResult<Vec2> {
        match self.get_entity(id) {
            Some(SketchEntity::Point { position, .. }) => Ok(*position),
            Some(_) => Err(SketchError::NotAPoint(id)),
            None => Err(SketchError::EntityNotFound(id)),
        }
    }

    /// Add a point
    pub fn add_point(&mut self, position: Vec2) -> Uuid {
        let id = Uuid::new_v4();
        self.entities.push(SketchEntity::Point { id, position });
        id
    }

    /// Add a line between two existing points
    pub fn add_line(&mut self, start: Uuid, end: Uuid) -> SketchResult<Uuid> {
        let a = self.point_position(start)?;
        let b = self.point_position(end)?;
        if start == end || a.distance_squared(b) <= f32::EPSILON {
            return Err(SketchError::DegenerateGeometry(
                "Line has zero length".into(),
            ));
        }

        let id = Uuid::new_v4();
        self.entities.push(SketchEntity::Line { id, start, end });
        Ok(id)
    }

    /// Add a circle by center and radius
    pub fn add_circle(&mut self, center: Vec2, radius: f32) -> SketchResult<Uuid> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(SketchError::DegenerateGeometry(format!(
                "Circle radius must be positive, got {}",
                radius
            )));
        }

        let center = self.add_point(center);
        let id = Uuid::new_v4();
        self.entities.push(SketchEntity::Circle { id, center, radius });
        Ok(id)
    }

    /// Add an axis-aligned rectangle from two opposite corners
    ///
    /// Returns the four line IDs, counter-clockwise from the minimum corner.
    pub fn add_rectangle(&mut self, corner1: Vec2, corner2: Vec2) -> SketchResult<[Uuid; 4]> {
        let min = corner1.min(corner2);
        let max = corner1.max(corner2);
        let size = max - min;
        if !(size.x > 0.0 && size.y > 0.0) {
            return Err(SketchError::DegenerateGeometry(format!(
                "Rectangle has zero area: {:?} to {:?}",
                corner1, corner2
            )));
        }

        let p0 = self.add_point(min);
        let p1 = self.add_point(Vec2::new(max.x, min.y));
        let p2 = self.add_point(max);
        let p3 = self.add_point(Vec2::new(min.x, max.y));

        Ok([
            self.add_line(p0, p1)?,
            self.add_line(p1, p2)?,
            self.add_line(p2, p3)?,
            self.add_line(p3, p0)?,
        ])
    }

    /// Extract closed profiles from the sketch curves
    ///
    /// Circles yield one profile each. Lines are chained end to start through
    /// shared point IDs; chains that return to their first point become
    /// profiles, open chains are ignored. Order follows entity insertion.
    pub fn extract_profiles(&self) -> SketchResult<Vec<Wire2D>> {
        let lines: Vec<(Uuid, Uuid, Uuid)> = self
            .entities
            .iter()
            .filter_map(|e| match e {
                SketchEntity::Line { id, start, end } => Some((*id, *start, *end)),
                _ => None,
            })
            .collect();

        let mut used: HashSet<Uuid> = HashSet::new();
        let mut profiles = Vec::new();

        for entity in &self.entities {
            match entity {
                SketchEntity::Circle { center, radius, .. } => {
                    let center = self.point_position(*center)?;
                    profiles.push(Wire2D::circle(center, *radius, CIRCLE_SEGMENTS));
                }
                SketchEntity::Line { id, start, end } if !used.contains(id) => {
                    if let Some(points) = self.walk_loop(*id, *start, *end, &lines, &mut used)? {
                        profiles.push(Wire2D::new(points, true));
                    }
                }
                _ => {}
            }
        }

        Ok(profiles)
    }

    /// Follow lines from `first` until the chain closes or dead-ends
    fn walk_loop(
        &self,
        first: Uuid,
        start: Uuid,
        end: Uuid,
        lines: &[(Uuid, Uuid, Uuid)],
        used: &mut HashSet<Uuid>,
    ) -> SketchResult<Option<Vec<Vec2>>> {
        let mut chain = vec![start];
        let mut current = end;
        used.insert(first);

        while current != start {
            let next = lines.iter().find(|(id, a, b)| {
                !used.contains(id) && (*a == current || *b == current)
            });
            let Some(&(id, a, b)) = next else {
                return Ok(None);
            };
            used.insert(id);
            chain.push(current);
            current = if a == current { b } else { a };
        }

        let points = chain
            .iter()
            .map(|p| self.point_position(*p))
            .collect::<SketchResult<Vec<_>>>()?;
        Ok(Some(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_yields_one_profile() {
        let mut sketch = Sketch::new("Base", SketchPlane::xy());
        sketch
            .add_rectangle(Vec2::ZERO, Vec2::new(100.0, 80.0))
            .unwrap();

        let profiles = sketch.extract_profiles().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].points.len(), 4);
        assert_relative_eq!(profiles[0].signed_area(), 8000.0);
    }

    #[test]
    fn test_circle_profile_is_centered() {
        let mut sketch = Sketch::new("Tube", SketchPlane::xy());
        sketch.add_circle(Vec2::new(8.0, 40.0), 8.0).unwrap();

        let profiles = sketch.extract_profiles().unwrap();
        assert_eq!(profiles.len(), 1);
        let profile = &profiles[0];
        assert_eq!(profile.points.len(), CIRCLE_SEGMENTS as usize);
        assert_relative_eq!(profile.centroid().x, 8.0, epsilon = 1e-3);
        assert_relative_eq!(profile.centroid().y, 40.0, epsilon = 1e-3);
        for p in &profile.points {
            assert_relative_eq!(p.distance(Vec2::new(8.0, 40.0)), 8.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_open_chain_is_not_a_profile() {
        let mut sketch = Sketch::new("Open", SketchPlane::xy());
        let a = sketch.add_point(Vec2::ZERO);
        let b = sketch.add_point(Vec2::X);
        let c = sketch.add_point(Vec2::ONE);
        sketch.add_line(a, b).unwrap();
        sketch.add_line(b, c).unwrap();

        assert!(sketch.extract_profiles().unwrap().is_empty());
    }

    #[test]
    fn test_reversed_lines_still_close() {
        let mut sketch = Sketch::new("Triangle", SketchPlane::xy());
        let a = sketch.add_point(Vec2::ZERO);
        let b = sketch.add_point(Vec2::new(4.0, 0.0));
        let c = sketch.add_point(Vec2::new(0.0, 3.0));
        sketch.add_line(a, b).unwrap();
        sketch.add_line(c, b).unwrap();
        sketch.add_line(c, a).unwrap();

        let profiles = sketch.extract_profiles().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_relative_eq!(profiles[0].signed_area().abs(), 6.0);
    }

    #[test]
    fn test_degenerate_geometry_is_rejected() {
        let mut sketch = Sketch::new("Bad", SketchPlane::xy());
        assert!(matches!(
            sketch.add_circle(Vec2::ZERO, 0.0),
            Err(SketchError::DegenerateGeometry(_))
        ));
        assert!(sketch.add_circle(Vec2::ZERO, -1.0).is_err());
        assert!(sketch.add_circle(Vec2::ZERO, f32::NAN).is_err());
        assert!(sketch.add_rectangle(Vec2::ZERO, Vec2::new(5.0, 0.0)).is_err());
        assert!(sketch.is_empty());
    }

    #[test]
    fn test_offset_plane_maps_to_world() {
        let plane = SketchPlane::xy_offset(50.0);
        assert_eq!(plane.to_world(Vec2::new(1.0, 2.0)), Vec3::new(1.0, 2.0, 50.0));
    }
}
