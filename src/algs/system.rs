//! Sparse linear system assembled from equation terms.
//!
//! Rows `0..N` are cell balances and rows `N..N+k` belong to auxiliary
//! unknowns. Entries accumulate in a [`TriMat`]; duplicates are summed when
//! the system is converted to CSR for solving.

use super::higher_order::{AuxiliaryArena, IntermediateField};
use crate::data::bc::BoundaryMap;
use crate::fvm_error::FvmError;
use sprs::{CsMat, TriMat};
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Per-face coefficients recorded by terms and applied once boundary
/// conditions are known.
///
/// A fixed value `g` adds `value_diagonal` to the owner's diagonal and
/// `value_rhs * g` to its right-hand side; a fixed flux `q` adds
/// `flux_rhs * q` to the right-hand side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundaryCoefficients {
    pub value_diagonal: f64,
    pub value_rhs: f64,
    pub flux_rhs: f64,
}

impl AddAssign for BoundaryCoefficients {
    fn add_assign(&mut self, rhs: Self) {
        self.value_diagonal += rhs.value_diagonal;
        self.value_rhs += rhs.value_rhs;
        self.flux_rhs += rhs.flux_rhs;
    }
}

/// Square sparse system `A x = b` of size `N + k`.
#[derive(Debug)]
pub struct LinearSystem {
    cells: usize,
    matrix: TriMat<f64>,
    rhs: Vec<f64>,
    boundary: BTreeMap<usize, (usize, BoundaryCoefficients)>,
    auxiliary: AuxiliaryArena,
    intermediate: Option<IntermediateField>,
}

impl LinearSystem {
    /// Empty system over `cells` unknowns.
    pub fn new(cells: usize) -> Self {
        Self::with_auxiliary(cells, AuxiliaryArena::empty(cells))
    }

    /// Empty system over `cells` unknowns plus one unknown per arena entry.
    pub fn with_auxiliary(cells: usize, auxiliary: AuxiliaryArena) -> Self {
        let size = cells + auxiliary.len();
        Self {
            cells,
            matrix: TriMat::new((size, size)),
            rhs: vec![0.0; size],
            boundary: BTreeMap::new(),
            auxiliary,
            intermediate: None,
        }
    }

    /// Number of cell unknowns `N`.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells
    }

    /// Total number of unknowns `N + k`.
    #[inline]
    pub fn size(&self) -> usize {
        self.rhs.len()
    }

    #[inline]
    pub fn auxiliary(&self) -> &AuxiliaryArena {
        &self.auxiliary
    }

    #[inline]
    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }

    /// Accumulate `value` into `A[row, col]`.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.matrix.add_triplet(row, col, value);
        }
    }

    /// Accumulate `value` into `b[row]`.
    #[inline]
    pub fn add_rhs(&mut self, row: usize, value: f64) {
        self.rhs[row] += value;
    }

    /// Accumulate boundary coefficients for `face`, owned by cell `owner`.
    pub fn record_boundary(&mut self, face: usize, owner: usize, coefficients: BoundaryCoefficients) {
        self.boundary
            .entry(face)
            .or_insert((owner, BoundaryCoefficients::default()))
            .1 += coefficients;
    }

    /// Coefficients recorded for `face`.
    pub fn boundary_coefficients(&self, face: usize) -> Option<BoundaryCoefficients> {
        self.boundary.get(&face).map(|(_, c)| *c)
    }

    /// Fold the recorded boundary coefficients into the matrix and RHS.
    ///
    /// Faces without a fixed value or fixed flux stay closed. The ledger is
    /// consumed so the pass cannot be applied twice.
    pub fn apply_boundary_conditions(&mut self, boundaries: &BoundaryMap) {
        let ledger = std::mem::take(&mut self.boundary);
        let mut applied = 0usize;
        for (face, (owner, c)) in ledger {
            let Some(constraints) = boundaries.get(face) else {
                continue;
            };
            if let Some(g) = constraints.value {
                self.add(owner, owner, c.value_diagonal);
                self.rhs[owner] += c.value_rhs * g;
                applied += 1;
            }
            if let Some(q) = constraints.flux {
                self.rhs[owner] += c.flux_rhs * q;
                applied += 1;
            }
        }
        log::trace!("applied {applied} boundary constraints");
    }

    pub(crate) fn set_intermediate(&mut self, field: IntermediateField) -> Result<(), FvmError> {
        if self.intermediate.is_some() {
            return Err(FvmError::InvalidParameter(
                "an equation may contain at most one fourth-order diffusion term".into(),
            ));
        }
        self.intermediate = Some(field);
        Ok(())
    }

    pub(crate) fn intermediate(&self) -> Option<&IntermediateField> {
        self.intermediate.as_ref()
    }

    /// Number of stored triplets, duplicates included.
    pub fn triplet_count(&self) -> usize {
        self.matrix.nnz()
    }

    /// Matrix in CSR form with duplicate entries summed.
    pub fn to_csr(&self) -> CsMat<f64> {
        self.matrix.to_csr()
    }

    /// Row-major dense copy of the matrix.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        csr_to_dense(&self.to_csr())
    }
}

/// Row-major dense copy of a CSR matrix.
pub(crate) fn csr_to_dense(csr: &CsMat<f64>) -> Vec<Vec<f64>> {
    let mut dense = vec![vec![0.0; csr.cols()]; csr.rows()];
    for (row, vec) in csr.outer_iterator().enumerate() {
        for (col, &value) in vec.iter() {
            dense[row][col] += value;
        }
    }
    dense
}
