//! Truck CAD Kernel Backend
//!
//! Pure Rust B-Rep kernel using the Truck library.
//!
//! Profiles are polygonal, so circular sketch curves arrive here as
//! many-sided prisms. Booleans go through `truck-shapeops`.

use glam::{Vec2, Vec3};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use truck_modeling::{Point3, Solid as TruckSolid, Vector3, Vertex, Wire, builder};

use super::{BooleanType, CadError, CadKernel, CadResult, Solid, Wire2D};

/// Tolerance handed to truck-shapeops for intersection curves
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Truck-based CAD kernel
pub struct TruckKernel {
    /// Storage for solid data (keyed by UUID)
    solids: Mutex<HashMap<Uuid, TruckSolid>>,
}

impl TruckKernel {
    /// Create a new Truck kernel
    pub fn new() -> Self {
        Self {
            solids: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> CadResult<MutexGuard<'_, HashMap<Uuid, TruckSolid>>> {
        self.solids
            .lock()
            .map_err(|_| CadError::OperationFailed("Truck solid store poisoned".into()))
    }

    /// Store a solid and return a Solid reference
    fn store_solid(&self, solid: TruckSolid) -> CadResult<Solid> {
        let id = Uuid::new_v4();
        self.lock()?.insert(id, solid);
        Ok(Solid::new(id).with_kernel_data())
    }

    /// Get a stored solid by ID
    fn get_solid(&self, id: Uuid) -> CadResult<TruckSolid> {
        self.lock()?
            .get(&id)
            .cloned()
            .ok_or(CadError::SolidNotFound(id))
    }

    /// Convert 2D points to 3D points on a plane
    fn points_to_3d(
        &self,
        points: &[Vec2],
        plane_origin: Vec3,
        plane_x_axis: Vec3,
        plane_y_axis: Vec3,
    ) -> Vec<Point3> {
        let origin = to_point(plane_origin);
        let u = to_vector(plane_x_axis);
        let v = to_vector(plane_y_axis);

        points
            .iter()
            .map(|p| origin + u * p.x as f64 + v * p.y as f64)
            .collect()
    }

    /// Create a wire from 2D points
    fn create_wire(
        &self,
        profile: &Wire2D,
        plane_origin: Vec3,
        plane_x_axis: Vec3,
        plane_y_axis: Vec3,
    ) -> Wire {
        let points_3d = self.points_to_3d(&profile.points, plane_origin, plane_x_axis, plane_y_axis);

        let vertices: Vec<Vertex> = points_3d.iter().map(|p| builder::vertex(*p)).collect();

        let n = vertices.len();
        let edges: Vec<_> = (0..n)
            .map(|i| {
                let v0 = &vertices[i];
                let v1 = &vertices[(i + 1) % n];
                builder::line(v0, v1)
            })
            .collect();

        edges.into()
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn to_point(v: Vec3) -> Point3 {
    Point3::new(v.x as f64, v.y as f64, v.z as f64)
}

fn to_vector(v: Vec3) -> Vector3 {
    Vector3::new(v.x as f64, v.y as f64, v.z as f64)
}

impl CadKernel for TruckKernel {
    fn name(&self) -> &str {
        "truck"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn extrude(
        &self,
        profile: &Wire2D,
        plane_origin: Vec3,
        plane_x_axis: Vec3,
        plane_y_axis: Vec3,
        direction: Vec3,
        distance: f32,
    ) -> CadResult<Solid> {
        profile.validate()?;
        if !(distance > 0.0) {
            return Err(CadError::OperationFailed(format!(
                "Extrusion distance must be positive, got {}",
                distance
            )));
        }

        let wire = self.create_wire(profile, plane_origin, plane_x_axis, plane_y_axis);
        let dir = to_vector(direction.normalize_or_zero() * distance);

        let face = builder::try_attach_plane(&[wire])
            .map_err(|e| CadError::OperationFailed(format!("Failed to create face: {:?}", e)))?;

        let solid = builder::tsweep(&face, dir);
        tracing::trace!(distance, "truck extrude");

        self.store_solid(solid)
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid> {
        let target = self.get_solid(a.id)?;
        let mut tool = self.get_solid(b.id)?;

        let result = match op {
            BooleanType::Union => truck_shapeops::or(&target, &tool, BOOLEAN_TOLERANCE),
            BooleanType::Intersect => truck_shapeops::and(&target, &tool, BOOLEAN_TOLERANCE),
            BooleanType::Subtract => {
                // A - B == A & !B
                tool.not();
                truck_shapeops::and(&target, &tool, BOOLEAN_TOLERANCE)
            }
        }
        .ok_or_else(|| CadError::BooleanFailed(format!("{:?} produced no solid", op)))?;

        self.store_solid(result)
    }

    fn release(&self, solid: &Solid) -> CadResult<()> {
        self.lock()?.remove(&solid.id);
        Ok(())
    }
}
