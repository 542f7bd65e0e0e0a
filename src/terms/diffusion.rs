//! Diffusion `∇·(D∇φ)` with an orthogonal central-difference face gradient.
//!
//! Interior faces couple their two cells symmetrically with `c = D A / d`.
//! Boundary faces only record coefficients; the equation's boundary pass
//! turns them into a Dirichlet penalty or a prescribed flux.

use super::coefficient::Coefficient;
use super::{AssemblyContext, map_faces};
use crate::algs::higher_order::IntermediateField;
use crate::algs::system::{BoundaryCoefficients, LinearSystem};
use crate::fvm_error::FvmError;
use serde::{Deserialize, Serialize};

/// Second-order diffusion, or the bi-harmonic
/// `∇·(D_outer ∇(∇·(D_inner ∇φ)))`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffusionTerm {
    SecondOrder(Coefficient),
    FourthOrder {
        outer: Coefficient,
        inner: Coefficient,
    },
}

impl DiffusionTerm {
    /// `∇·(D∇φ)`.
    pub fn new(coefficient: impl Into<Coefficient>) -> Self {
        DiffusionTerm::SecondOrder(coefficient.into())
    }

    /// `∇·(D_outer ∇(∇·(D_inner ∇φ)))`, assembled as two chained passes.
    pub fn fourth_order(outer: impl Into<Coefficient>, inner: impl Into<Coefficient>) -> Self {
        DiffusionTerm::FourthOrder {
            outer: outer.into(),
            inner: inner.into(),
        }
    }

    #[inline]
    pub fn is_fourth_order(&self) -> bool {
        matches!(self, DiffusionTerm::FourthOrder { .. })
    }

    pub(crate) fn assemble(
        &self,
        ctx: &AssemblyContext<'_>,
        system: &mut LinearSystem,
    ) -> Result<(), FvmError> {
        match self {
            DiffusionTerm::SecondOrder(coefficient) => {
                second_order_pass(coefficient, ctx, system, true)
            }
            DiffusionTerm::FourthOrder { outer, inner } => {
                fourth_order_pass(outer, inner, ctx, system)
            }
        }
    }
}

/// Add the interior couplings of `∇·(D∇φ)`; boundary faces are recorded in
/// the system's ledger when `record_boundary` is set and left closed
/// otherwise.
fn second_order_pass(
    coefficient: &Coefficient,
    ctx: &AssemblyContext<'_>,
    system: &mut LinearSystem,
    record_boundary: bool,
) -> Result<(), FvmError> {
    let values = coefficient.face_values(ctx)?;
    let couplings = map_faces(ctx.faces().len(), |face| {
        let g = &ctx.faces()[face];
        Ok(values[face] * g.area / g.distance)
    })?;

    for (g, c) in ctx.faces().iter().zip(couplings) {
        match g.neighbor {
            Some(n) => {
                let o = g.owner;
                system.add(o, o, c);
                system.add(n, n, c);
                system.add(o, n, -c);
                system.add(n, o, -c);
            }
            None if record_boundary => system.record_boundary(
                g.face,
                g.owner,
                BoundaryCoefficients {
                    value_diagonal: c,
                    value_rhs: c,
                    flux_rhs: values[g.face] * g.area,
                },
            ),
            None => {}
        }
    }
    Ok(())
}

/// Chain an inner pass (with order 0/1 constraints) and an outer pass (with
/// one ghost per auxiliary unknown) through `ψ_k = (b_k − (Mφ)_k) / V_k`.
fn fourth_order_pass(
    outer: &Coefficient,
    inner: &Coefficient,
    ctx: &AssemblyContext<'_>,
    system: &mut LinearSystem,
) -> Result<(), FvmError> {
    let cells = system.cell_count();

    let mut inner_system = LinearSystem::new(cells);
    second_order_pass(inner, ctx, &mut inner_system, true)?;
    inner_system.apply_boundary_conditions(ctx.boundaries());
    let inner_operator = inner_system.to_csr();
    let inner_rhs = inner_system.rhs().to_vec();

    let mut outer_system = LinearSystem::new(cells);
    second_order_pass(outer, ctx, &mut outer_system, false)?;
    let outer_values = outer.face_values(ctx)?;
    let mut ghosts = Vec::with_capacity(system.auxiliary().len());
    for (index, aux) in system.auxiliary().iter() {
        let g = &ctx.faces()[aux.face];
        let c = outer_values[aux.face] * g.area / (2.0 * g.distance);
        outer_system.add(aux.owner, aux.owner, c);
        ghosts.push((aux.owner, index, -c));
    }
    let outer_operator = outer_system.to_csr();

    let volumes = ctx.volumes();
    for (i, row) in outer_operator.outer_iterator().enumerate() {
        for (k, &mo) in row.iter() {
            let scale = -mo / volumes[k];
            if let Some(inner_row) = inner_operator.outer_view(k) {
                for (j, &mi) in inner_row.iter() {
                    system.add(i, j, scale * mi);
                }
            }
            system.add_rhs(i, scale * inner_rhs[k]);
        }
    }
    for (row, col, value) in ghosts {
        system.add(row, col, value);
    }

    system.set_intermediate(IntermediateField {
        operator: inner_operator,
        rhs: inner_rhs,
        volumes: volumes.to_vec(),
        inner_coefficient: inner.face_values(ctx)?,
    })
}
