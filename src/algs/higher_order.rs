//! Auxiliary unknowns for boundary constraints of order two and three.
//!
//! A fourth-order diffusion term is assembled as two chained second-order
//! passes sharing the intermediate field `ψ = ∇·(D_in ∇φ)`. Each face with a
//! second or third derivative constraint gets one ghost value of `ψ`, stored as
//! an extra unknown appended after the `N` cell unknowns. The ghost row ties
//! the ghost to the boundary cell's `ψ`, which is itself written in terms of
//! `φ` through the inner operator.

use super::system::LinearSystem;
use crate::data::bc::BoundaryMap;
use crate::fvm_error::FvmError;
use crate::mesh::MeshAdapter;
use sprs::CsMat;
use std::collections::BTreeMap;

/// One extra unknown: the ghost value of `ψ` behind a constrained face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuxiliaryUnknown {
    /// Constrained boundary face.
    pub face: usize,
    /// Cell owning `face`.
    pub owner: usize,
    /// Derivative order of the constraint (2 or 3).
    pub order: u32,
    /// Prescribed derivative.
    pub value: f64,
}

/// Extra unknowns indexed `N..N+k`, each mapped back to its face.
#[derive(Clone, Debug, PartialEq)]
pub struct AuxiliaryArena {
    cells: usize,
    unknowns: Vec<AuxiliaryUnknown>,
    by_face: BTreeMap<usize, usize>,
}

impl AuxiliaryArena {
    /// Arena with no auxiliary unknowns over `cells` cell unknowns.
    pub fn empty(cells: usize) -> Self {
        Self {
            cells,
            unknowns: Vec::new(),
            by_face: BTreeMap::new(),
        }
    }

    /// One unknown per face carrying a constraint of order two or three, in
    /// ascending face order.
    pub fn from_boundaries(mesh: &dyn MeshAdapter, boundaries: &BoundaryMap) -> Result<Self, FvmError> {
        let cells = mesh.cell_count();
        let mut unknowns = Vec::new();
        let mut by_face = BTreeMap::new();
        for (face, order, value) in boundaries.higher_order() {
            let owner = mesh.face_owners(face)?.owner;
            by_face.insert(face, cells + unknowns.len());
            unknowns.push(AuxiliaryUnknown {
                face,
                owner,
                order,
                value,
            });
        }
        Ok(Self {
            cells,
            unknowns,
            by_face,
        })
    }

    /// Number of auxiliary unknowns `k`.
    #[inline]
    pub fn len(&self) -> usize {
        self.unknowns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.unknowns.is_empty()
    }

    /// `(global index, unknown)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AuxiliaryUnknown)> + '_ {
        self.unknowns
            .iter()
            .enumerate()
            .map(move |(i, u)| (self.cells + i, u))
    }

    /// Global index of the unknown attached to `face`.
    pub fn index_of(&self, face: usize) -> Option<usize> {
        self.by_face.get(&face).copied()
    }

    /// Face behind the global unknown `index`.
    pub fn face_of(&self, index: usize) -> Option<usize> {
        index
            .checked_sub(self.cells)
            .and_then(|i| self.unknowns.get(i))
            .map(|u| u.face)
    }

    /// Cell part of an extended solution vector.
    pub fn project<'s>(&self, solution: &'s [f64]) -> &'s [f64] {
        &solution[..self.cells.min(solution.len())]
    }
}

/// Inner operator of a fourth-order term: `ψ_k = (rhs_k − Σ_j operator[k,j] φ_j) / V_k`.
#[derive(Clone, Debug)]
pub struct IntermediateField {
    pub(crate) operator: CsMat<f64>,
    pub(crate) rhs: Vec<f64>,
    pub(crate) volumes: Vec<f64>,
    /// Inner coefficient interpolated to every face.
    pub(crate) inner_coefficient: Vec<f64>,
}

/// Append one row per auxiliary unknown expressing its face constraint.
///
/// Order 2: `(ψ_g + ψ_o) / 2 = D_in g`.
/// Order 3: `(ψ_g − ψ_o) / (2 d_b) = D_in q`.
pub fn assemble_auxiliary_rows(
    system: &mut LinearSystem,
    mesh: &dyn MeshAdapter,
) -> Result<(), FvmError> {
    if system.auxiliary().is_empty() {
        return Ok(());
    }
    let field = system.intermediate().ok_or_else(|| {
        FvmError::InvalidParameter(
            "auxiliary unknowns require a fourth-order diffusion term".into(),
        )
    })?;

    let mut triplets = Vec::new();
    let mut rhs = Vec::with_capacity(system.auxiliary().len());
    for (row, aux) in system.auxiliary().iter() {
        let o = aux.owner;
        let volume = field.volumes[o];
        let d_in = field.inner_coefficient[aux.face];
        let b_o = field.rhs[o];
        // Weight of ψ_g and of −ψ_o in the constraint.
        let (ghost, cell, target) = match aux.order {
            2 => (0.5, -0.5, d_in * aux.value),
            3 => {
                let s = 0.5 / mesh.cell_distance(aux.face)?;
                (s, s, d_in * aux.value)
            }
            order => {
                return Err(FvmError::InvalidParameter(format!(
                    "no auxiliary row for derivative order {order}"
                )));
            }
        };
        // Substitute ψ_o = (b_o − Σ_j M[o,j] φ_j) / V_o.
        triplets.push((row, row, ghost));
        if let Some(inner_row) = field.operator.outer_view(o) {
            for (j, &m) in inner_row.iter() {
                triplets.push((row, j, cell * m / volume));
            }
        }
        rhs.push((row, target + cell * b_o / volume));
    }

    for (r, c, v) in triplets {
        system.add(r, c, v);
    }
    for (r, v) in rhs {
        system.add_rhs(r, v);
    }
    log::debug!("assembled {} auxiliary rows", system.auxiliary().len());
    Ok(())
}
