//! FvmError: unified error type for fvm-sieve public APIs
//!
//! Every fallible operation in the crate (mesh queries, term assembly,
//! boundary-condition resolution, linear solves) reports through this enum so
//! callers of [`Equation::solve`](crate::algs::equation::Equation::solve) see a
//! single error surface.

use crate::mesh::Boundary;
use std::fmt;
use thiserror::Error;

/// The kind of mesh entity an index refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshEntity {
    Cell,
    Face,
}

impl fmt::Display for MeshEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshEntity::Cell => f.write_str("cell"),
            MeshEntity::Face => f.write_str("face"),
        }
    }
}

/// Unified error type for fvm-sieve operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FvmError {
    /// A cell or face index does not exist on the mesh.
    #[error("{entity} index {index} out of range (mesh has {count})")]
    OutOfRange {
        entity: MeshEntity,
        index: usize,
        count: usize,
    },
    /// A coefficient, source or value array disagrees with mesh cardinality.
    #[error("shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Two constraints of the same derivative order target the same face.
    #[error("conflicting boundary conditions of derivative order {order} on face {face}")]
    BoundaryConditionConflict { face: usize, order: u32 },
    /// A boundary condition names a face shared by two cells.
    #[error("face {face} is not a boundary face")]
    NotBoundaryFace { face: usize },
    /// The named boundary does not exist for the mesh dimension.
    #[error("boundary `{boundary}` is not available on a {dimension}D mesh")]
    UnknownBoundary { boundary: Boundary, dimension: usize },
    /// The linear solver reported singularity or non-convergence.
    #[error("linear solver `{solver}` failed after {iterations} iterations: {reason}")]
    SolveFailure {
        solver: &'static str,
        iterations: usize,
        residual: Option<f64>,
        reason: String,
    },
    /// Degenerate mesh geometry (zero spacing, zero distance between centers, ...).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A parameter is outside the supported range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl FvmError {
    /// Shorthand for an out-of-range cell index.
    pub fn cell_out_of_range(index: usize, count: usize) -> Self {
        FvmError::OutOfRange {
            entity: MeshEntity::Cell,
            index,
            count,
        }
    }

    /// Shorthand for an out-of-range face index.
    pub fn face_out_of_range(index: usize, count: usize) -> Self {
        FvmError::OutOfRange {
            entity: MeshEntity::Face,
            index,
            count,
        }
    }

    /// Residual attached to a [`FvmError::SolveFailure`], if any.
    pub fn residual(&self) -> Option<f64> {
        match self {
            FvmError::SolveFailure { residual, .. } => *residual,
            _ => None,
        }
    }
}

/// Checks that `found == expected`, reporting `what` on mismatch.
pub(crate) fn ensure_len(what: &'static str, expected: usize, found: usize) -> Result<(), FvmError> {
    if expected == found {
        Ok(())
    } else {
        Err(FvmError::ShapeMismatch {
            what,
            expected,
            found,
        })
    }
}
