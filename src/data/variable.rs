//! Cell-centered field storage.
//!
//! A [`CellVariable`] borrows its mesh and owns two dense buffers: the current
//! values and the values before the last solve. Storage is laid out
//! cell-major, `components` entries per cell.

use crate::fvm_error::{FvmError, ensure_len};
use crate::mesh::MeshAdapter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tensor rank of a cell variable, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// One value per cell.
    Scalar,
    /// `k` values per cell.
    Vector(usize),
}

impl Rank {
    /// Values stored per cell.
    #[inline]
    pub fn components(self) -> usize {
        match self {
            Rank::Scalar => 1,
            Rank::Vector(k) => k,
        }
    }
}

/// Named field sampled at cell centers.
pub struct CellVariable<'m> {
    name: String,
    mesh: &'m dyn MeshAdapter,
    rank: Rank,
    values: Vec<f64>,
    old_values: Vec<f64>,
}

impl fmt::Debug for CellVariable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellVariable")
            .field("name", &self.name)
            .field("rank", &self.rank)
            .field("cells", &self.mesh.cell_count())
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl<'m> CellVariable<'m> {
    /// Scalar variable with every cell set to `initial`.
    pub fn new(name: impl Into<String>, mesh: &'m dyn MeshAdapter, initial: f64) -> Self {
        let values = vec![initial; mesh.cell_count()];
        Self {
            name: name.into(),
            mesh,
            rank: Rank::Scalar,
            old_values: values.clone(),
            values,
        }
    }

    /// Scalar variable from explicit per-cell values.
    pub fn try_from_values(
        name: impl Into<String>,
        mesh: &'m dyn MeshAdapter,
        values: Vec<f64>,
    ) -> Result<Self, FvmError> {
        ensure_len("variable values", mesh.cell_count(), values.len())?;
        Ok(Self {
            name: name.into(),
            mesh,
            rank: Rank::Scalar,
            old_values: values.clone(),
            values,
        })
    }

    /// Vector variable with `components` entries per cell, all set to `initial`.
    pub fn try_vector(
        name: impl Into<String>,
        mesh: &'m dyn MeshAdapter,
        components: usize,
        initial: f64,
    ) -> Result<Self, FvmError> {
        if components == 0 {
            return Err(FvmError::InvalidParameter(
                "vector variable needs at least one component".into(),
            ));
        }
        let values = vec![initial; mesh.cell_count() * components];
        Ok(Self {
            name: name.into(),
            mesh,
            rank: Rank::Vector(components),
            old_values: values.clone(),
            values,
        })
    }

    /// Name used in logs.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mesh the variable is sampled on.
    #[inline]
    pub fn mesh(&self) -> &'m dyn MeshAdapter {
        self.mesh
    }

    /// Rank fixed at construction.
    #[inline]
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Current values, cell-major.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values as they were before the last solve or [`CellVariable::update_old`].
    #[inline]
    pub fn old_values(&self) -> &[f64] {
        &self.old_values
    }

    /// Components stored for `cell`.
    pub fn try_value(&self, cell: usize) -> Result<&[f64], FvmError> {
        let count = self.mesh.cell_count();
        if cell >= count {
            return Err(FvmError::cell_out_of_range(cell, count));
        }
        let k = self.rank.components();
        Ok(&self.values[cell * k..(cell + 1) * k])
    }

    /// Replace the current values; the length must match the storage length.
    pub fn try_set_values(&mut self, values: &[f64]) -> Result<(), FvmError> {
        ensure_len("variable values", self.values.len(), values.len())?;
        self.values.copy_from_slice(values);
        Ok(())
    }

    /// Copy the current values into the old-value buffer.
    pub fn update_old(&mut self) {
        self.old_values.copy_from_slice(&self.values);
    }

    /// Elementwise `|a - b| <= atol + rtol * |b|` against `expected`.
    ///
    /// Returns `false` on a length mismatch or any non-finite comparison.
    pub fn all_close(&self, expected: &[f64], rtol: f64, atol: f64) -> bool {
        self.values.len() == expected.len()
            && self
                .values
                .iter()
                .zip(expected)
                .all(|(a, b)| (a - b).abs() <= atol + rtol * b.abs())
    }

    /// Snapshot the current values and install `solution` in one step.
    pub(crate) fn commit(&mut self, mut solution: Vec<f64>) -> Result<(), FvmError> {
        ensure_len("solution", self.values.len(), solution.len())?;
        std::mem::swap(&mut self.values, &mut solution);
        self.old_values = solution;
        Ok(())
    }
}
