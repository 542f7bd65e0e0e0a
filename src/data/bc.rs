//! Boundary conditions and their per-face resolution.
//!
//! A [`BoundaryCondition`] pairs an immutable list of boundary faces with a
//! constraint on the field or one of its outward normal derivatives.
//! [`BoundaryMap::resolve`] validates a set of conditions against a mesh and
//! indexes them by face for assembly.

use crate::fvm_error::FvmError;
use crate::mesh::{Boundary, MeshAdapter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest derivative order a boundary constraint may prescribe.
pub const MAX_CONSTRAINT_ORDER: u32 = 3;

/// Uniform or per-face constraint value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceValue {
    /// Same value on every face.
    Uniform(f64),
    /// One value per face of the condition, in face-list order.
    PerFace(Vec<f64>),
}

impl FaceValue {
    /// Value for the `i`-th face of the owning condition.
    #[inline]
    fn at(&self, i: usize) -> f64 {
        match self {
            FaceValue::Uniform(v) => *v,
            FaceValue::PerFace(values) => values[i],
        }
    }
}

impl From<f64> for FaceValue {
    fn from(v: f64) -> Self {
        FaceValue::Uniform(v)
    }
}

impl From<Vec<f64>> for FaceValue {
    fn from(values: Vec<f64>) -> Self {
        FaceValue::PerFace(values)
    }
}

/// What a boundary condition prescribes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Dirichlet value, derivative order 0.
    FixedValue,
    /// Outward normal derivative, derivative order 1.
    FixedFlux,
    /// Outward normal derivative of the given order.
    NthOrder(u32),
}

impl ConstraintKind {
    /// Derivative order of the constraint.
    pub fn order(self) -> u32 {
        match self {
            ConstraintKind::FixedValue => 0,
            ConstraintKind::FixedFlux => 1,
            ConstraintKind::NthOrder(n) => n,
        }
    }

    /// Canonical kind for a derivative order.
    pub fn from_order(order: u32) -> Self {
        match order {
            0 => ConstraintKind::FixedValue,
            1 => ConstraintKind::FixedFlux,
            n => ConstraintKind::NthOrder(n),
        }
    }
}

/// Constraint on a fixed set of boundary faces.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundaryCondition {
    faces: Vec<usize>,
    kind: ConstraintKind,
    value: FaceValue,
}

impl BoundaryCondition {
    /// Build a condition; per-face values must match the face list length.
    pub fn new(
        faces: impl Into<Vec<usize>>,
        kind: ConstraintKind,
        value: impl Into<FaceValue>,
    ) -> Result<Self, FvmError> {
        let faces = faces.into();
        let value = value.into();
        if let FaceValue::PerFace(values) = &value {
            crate::fvm_error::ensure_len("boundary values", faces.len(), values.len())?;
        }
        Ok(Self {
            faces,
            kind: ConstraintKind::from_order(kind.order()),
            value,
        })
    }

    /// Prescribe the field value on `faces`.
    pub fn fixed_value(
        faces: impl Into<Vec<usize>>,
        value: impl Into<FaceValue>,
    ) -> Result<Self, FvmError> {
        Self::new(faces, ConstraintKind::FixedValue, value)
    }

    /// Prescribe the outward normal derivative on `faces`.
    pub fn fixed_flux(
        faces: impl Into<Vec<usize>>,
        value: impl Into<FaceValue>,
    ) -> Result<Self, FvmError> {
        Self::new(faces, ConstraintKind::FixedFlux, value)
    }

    /// Prescribe the `order`-th outward normal derivative on `faces`.
    ///
    /// Orders 0 and 1 are stored as [`ConstraintKind::FixedValue`] and
    /// [`ConstraintKind::FixedFlux`].
    pub fn nth_order(
        faces: impl Into<Vec<usize>>,
        value: impl Into<FaceValue>,
        order: u32,
    ) -> Result<Self, FvmError> {
        Self::new(faces, ConstraintKind::from_order(order), value)
    }

    /// Condition covering every face of a named mesh boundary.
    pub fn on_boundary(
        mesh: &dyn MeshAdapter,
        boundary: Boundary,
        kind: ConstraintKind,
        value: impl Into<FaceValue>,
    ) -> Result<Self, FvmError> {
        Self::new(mesh.boundary_faces(boundary)?, kind, value)
    }

    /// Constrained faces, in the order given at construction.
    #[inline]
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// Normalized constraint kind.
    #[inline]
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// Derivative order, `0` for a fixed value.
    #[inline]
    pub fn order(&self) -> u32 {
        self.kind.order()
    }

    /// Prescribed value or derivative.
    #[inline]
    pub fn value(&self) -> &FaceValue {
        &self.value
    }
}

/// Constraints active on a single boundary face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceConstraints {
    /// Prescribed field value.
    pub value: Option<f64>,
    /// Prescribed outward normal derivative.
    pub flux: Option<f64>,
    /// Prescribed derivative of order two or three: `(order, value)`.
    pub higher: Option<(u32, f64)>,
}

impl FaceConstraints {
    fn insert(&mut self, face: usize, order: u32, value: f64) -> Result<(), FvmError> {
        let slot = match order {
            0 => &mut self.value,
            1 => &mut self.flux,
            _ => {
                return match self.higher {
                    None => {
                        self.higher = Some((order, value));
                        Ok(())
                    }
                    Some((existing, _)) if existing == order => {
                        Err(FvmError::BoundaryConditionConflict { face, order })
                    }
                    Some((existing, _)) => Err(FvmError::InvalidParameter(format!(
                        "face {face} carries derivative constraints of orders {existing} and {order}; \
                         at most one order above 1 is supported per face"
                    ))),
                };
            }
        };
        if slot.is_some() {
            return Err(FvmError::BoundaryConditionConflict { face, order });
        }
        *slot = Some(value);
        Ok(())
    }
}

/// Boundary conditions indexed by face, validated against a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryMap {
    faces: BTreeMap<usize, FaceConstraints>,
}

impl BoundaryMap {
    /// Validate `conditions` and index them by face.
    ///
    /// # Errors
    /// - [`FvmError::OutOfRange`] for a face index past the mesh.
    /// - [`FvmError::NotBoundaryFace`] for a face with two owners.
    /// - [`FvmError::BoundaryConditionConflict`] when two conditions of the
    ///   same order share a face.
    /// - [`FvmError::InvalidParameter`] for orders above
    ///   [`MAX_CONSTRAINT_ORDER`] or two different orders above 1 on one face.
    pub fn resolve(
        mesh: &dyn MeshAdapter,
        conditions: &[BoundaryCondition],
    ) -> Result<Self, FvmError> {
        let mut faces: BTreeMap<usize, FaceConstraints> = BTreeMap::new();
        for bc in conditions {
            let order = bc.order();
            if order > MAX_CONSTRAINT_ORDER {
                return Err(FvmError::InvalidParameter(format!(
                    "boundary constraints of derivative order {order} are not supported \
                     (maximum is {MAX_CONSTRAINT_ORDER})"
                )));
            }
            for (i, &face) in bc.faces.iter().enumerate() {
                if face >= mesh.face_count() {
                    return Err(FvmError::face_out_of_range(face, mesh.face_count()));
                }
                if !mesh.is_boundary_face(face)? {
                    return Err(FvmError::NotBoundaryFace { face });
                }
                faces
                    .entry(face)
                    .or_default()
                    .insert(face, order, bc.value.at(i))?;
            }
        }
        log::trace!(
            "resolved {} boundary conditions onto {} faces",
            conditions.len(),
            faces.len()
        );
        Ok(Self { faces })
    }

    /// Constraints on `face`, if any.
    #[inline]
    pub fn get(&self, face: usize) -> Option<&FaceConstraints> {
        self.faces.get(&face)
    }

    /// Prescribed value on `face`.
    #[inline]
    pub fn fixed_value(&self, face: usize) -> Option<f64> {
        self.get(face).and_then(|c| c.value)
    }

    /// Prescribed outward normal derivative on `face`.
    #[inline]
    pub fn fixed_flux(&self, face: usize) -> Option<f64> {
        self.get(face).and_then(|c| c.flux)
    }

    /// Constrained faces in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &FaceConstraints)> + '_ {
        self.faces.iter().map(|(&face, c)| (face, c))
    }

    /// `(face, order, value)` for every constraint of order two or three.
    pub fn higher_order(&self) -> impl Iterator<Item = (usize, u32, f64)> + '_ {
        self.faces
            .iter()
            .filter_map(|(&face, c)| c.higher.map(|(order, value)| (face, order, value)))
    }

    /// Number of faces carrying at least one constraint.
    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// True when no face is constrained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
