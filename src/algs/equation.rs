//! Equations: an ordered sum of terms plus a constant source.
//!
//! ```text
//! resolve BCs ─▶ auxiliary arena ─▶ term assembly ─▶ boundary pass
//!             ─▶ auxiliary rows ─▶ linear solve ─▶ projection ─▶ commit
//! ```

use super::higher_order::{AuxiliaryArena, assemble_auxiliary_rows};
use super::system::LinearSystem;
use crate::data::bc::{BoundaryCondition, BoundaryMap};
use crate::data::variable::{CellVariable, Rank};
use crate::fvm_error::FvmError;
use crate::mesh::MeshAdapter;
use crate::solvers::LinearSolver;
use crate::terms::{AssemblyContext, DiffusionTerm, Term};
use serde::{Deserialize, Serialize};

/// Accumulates terms into an [`Equation`].
#[derive(Clone, Debug, Default)]
pub struct EquationBuilder {
    terms: Vec<Term>,
    source: f64,
}

impl EquationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a term.
    pub fn term(mut self, term: impl Into<Term>) -> Self {
        self.terms.push(term.into());
        self
    }

    /// Add a constant to the scalar source offset.
    pub fn source(mut self, value: f64) -> Self {
        self.source += value;
        self
    }

    /// Freeze the equation.
    ///
    /// Fails with [`FvmError::InvalidParameter`] when more than one
    /// fourth-order diffusion term was added.
    pub fn build(self) -> Result<Equation, FvmError> {
        let fourth = self
            .terms
            .iter()
            .filter(|t| matches!(t, Term::Diffusion(d) if d.is_fourth_order()))
            .count();
        if fourth > 1 {
            return Err(FvmError::InvalidParameter(format!(
                "an equation may contain at most one fourth-order diffusion term, found {fourth}"
            )));
        }
        Ok(Equation {
            terms: self.terms,
            source: self.source,
        })
    }
}

/// Outcome of [`Equation::solve`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Cell unknowns written back.
    pub unknowns: usize,
    /// Auxiliary unknowns solved for and discarded.
    pub auxiliary: usize,
    pub iterations: usize,
    pub residual: f64,
}

/// Immutable sum of terms, `Σ terms + source = 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    terms: Vec<Term>,
    #[serde(default)]
    source: f64,
}

impl Equation {
    pub fn builder() -> EquationBuilder {
        EquationBuilder::new()
    }

    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Constant source added to every cell.
    #[inline]
    pub fn source_offset(&self) -> f64 {
        self.source
    }

    fn has_fourth_order(&self) -> bool {
        self.terms
            .iter()
            .any(|t| matches!(t, Term::Diffusion(d) if d.is_fourth_order()))
    }

    /// Build the linear system for `mesh` under `boundary_conditions`.
    ///
    /// Contributions add up term by term within one [`AssemblyContext`].
    /// Convection reads the summed second-order diffusivity of the whole
    /// equation, so assembling a convection term in an equation of its own
    /// (pure upwinding) differs from its share of a combined equation.
    pub fn assemble(
        &self,
        mesh: &dyn MeshAdapter,
        boundary_conditions: &[BoundaryCondition],
    ) -> Result<LinearSystem, FvmError> {
        let cells = mesh.cell_count();
        let boundaries = BoundaryMap::resolve(mesh, boundary_conditions)?;

        let arena = if self.has_fourth_order() {
            AuxiliaryArena::from_boundaries(mesh, &boundaries)?
        } else {
            let ignored = boundaries.higher_order().count();
            if ignored > 0 {
                log::warn!(
                    "ignoring {ignored} boundary constraints of order above 1: \
                     the equation has no fourth-order diffusion term"
                );
            }
            AuxiliaryArena::empty(cells)
        };

        let ctx = AssemblyContext::new(mesh, &boundaries, &self.terms)?;
        let mut system = LinearSystem::with_auxiliary(cells, arena);
        for term in &self.terms {
            term.assemble(&ctx, &mut system)?;
        }
        if self.source != 0.0 {
            for (cell, volume) in ctx.volumes().iter().enumerate() {
                system.add_rhs(cell, self.source * volume);
            }
        }
        system.apply_boundary_conditions(&boundaries);
        assemble_auxiliary_rows(&mut system, mesh)?;

        log::debug!(
            "assembled {} terms: {} cells, {} auxiliary unknowns, {} triplets",
            self.terms.len(),
            cells,
            system.auxiliary().len(),
            system.triplet_count()
        );
        Ok(system)
    }

    /// Assemble, solve and write the result into `variable`.
    ///
    /// The variable's current values seed the solver and are copied into its
    /// old-value buffer when the new values are committed. On any error the
    /// variable is left untouched.
    pub fn solve(
        &self,
        variable: &mut CellVariable<'_>,
        boundary_conditions: &[BoundaryCondition],
        solver: &dyn LinearSolver,
    ) -> Result<SolveReport, FvmError> {
        if let Rank::Vector(k) = variable.rank() {
            return Err(FvmError::ShapeMismatch {
                what: "variable components",
                expected: 1,
                found: k,
            });
        }
        let mesh = variable.mesh();
        let system = self.assemble(mesh, boundary_conditions)?;
        let matrix = system.to_csr();

        let mut guess = variable.values().to_vec();
        guess.resize(system.size(), 0.0);
        let solution = solver.solve(&matrix, system.rhs(), &guess)?;

        let values = system.auxiliary().project(&solution.values).to_vec();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FvmError::SolveFailure {
                solver: solver.name(),
                iterations: solution.iterations,
                residual: Some(solution.residual),
                reason: "solution contains non-finite values".into(),
            });
        }
        let report = SolveReport {
            unknowns: values.len(),
            auxiliary: system.auxiliary().len(),
            iterations: solution.iterations,
            residual: solution.residual,
        };
        variable.commit(values)?;

        log::debug!(
            "solved '{}' with {}: {} iterations, residual {:.3e}",
            variable.name(),
            solver.name(),
            report.iterations,
            report.residual
        );
        Ok(report)
    }
}

impl From<Term> for Equation {
    fn from(term: Term) -> Self {
        Equation {
            terms: vec![term],
            source: 0.0,
        }
    }
}

impl From<DiffusionTerm> for Equation {
    fn from(term: DiffusionTerm) -> Self {
        Term::from(term).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Grid;
    use crate::solvers::LinearLUSolver;
    use crate::terms::{ImplicitSourceTerm, SourceTerm};
    use approx::assert_relative_eq;

    #[test]
    fn builder_rejects_two_fourth_order_terms() {
        let err = Equation::builder()
            .term(DiffusionTerm::fourth_order(1.0, 1.0))
            .term(DiffusionTerm::fourth_order(1.0, 1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, FvmError::InvalidParameter(_)));
    }

    #[test]
    fn source_offset_accumulates() {
        let eq = Equation::builder()
            .term(SourceTerm::constant(1.0))
            .source(2.0)
            .source(0.5)
            .build()
            .unwrap();
        assert_eq!(eq.source_offset(), 2.5);

        let mesh = Grid::grid_1d(2.0, 2).unwrap();
        let system = eq.assemble(&mesh, &[]).unwrap();
        assert_eq!(system.rhs(), &[7.0, 7.0]);
    }

    #[test]
    fn linear_reaction_diffusion_solves() {
        // φ'' − φ = −1 with φ = 1 on both ends has φ ≡ 1.
        let mesh = Grid::grid_1d(0.1, 10).unwrap();
        let eq = Equation::builder()
            .term(DiffusionTerm::new(1.0))
            .term(ImplicitSourceTerm::new(-1.0))
            .source(1.0)
            .build()
            .unwrap();
        let bcs = [BoundaryCondition::fixed_value(vec![0, 10], 1.0).unwrap()];
        let mut phi = CellVariable::new("phi", &mesh, 0.0);
        let report = eq.solve(&mut phi, &bcs, &LinearLUSolver::new()).unwrap();
        assert_eq!(report.unknowns, 10);
        assert_eq!(report.auxiliary, 0);
        for v in phi.values() {
            assert_relative_eq!(*v, 1.0, epsilon = 1e-10);
        }
        assert_eq!(phi.old_values(), &[0.0; 10]);
    }

    #[test]
    fn vector_variables_are_rejected() {
        let mesh = Grid::grid_1d(1.0, 3).unwrap();
        let eq = Equation::from(DiffusionTerm::new(1.0));
        let mut u = CellVariable::try_vector("u", &mesh, 2, 0.0).unwrap();
        let err = eq.solve(&mut u, &[], &LinearLUSolver::new()).unwrap_err();
        assert!(matches!(err, FvmError::ShapeMismatch { found: 2, .. }));
    }

    #[test]
    fn higher_order_constraints_without_fourth_order_term_are_ignored() {
        let mesh = Grid::grid_1d(1.0, 3).unwrap();
        let eq = Equation::from(DiffusionTerm::new(1.0));
        let bcs = [
            BoundaryCondition::fixed_value(vec![0], 1.0).unwrap(),
            BoundaryCondition::nth_order(vec![3], 2.0, 2).unwrap(),
        ];
        let system = eq.assemble(&mesh, &bcs).unwrap();
        assert_eq!(system.size(), 3);
        assert!(system.auxiliary().is_empty());
    }
}
