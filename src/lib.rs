#![cfg_attr(docsrs, feature(doc_cfg))]
//! # fvm-sieve
//!
//! fvm-sieve assembles and solves cell-centered finite-volume discretizations
//! of steady scalar transport equations on structured grids. An equation is a
//! sum of diffusion (second or fourth order), convection and source terms; it
//! is assembled into a sparse linear system, handed to a linear solver, and the
//! result is written back into a [`CellVariable`](data::variable::CellVariable).
//!
//! ## Features
//! - Uniform 1D, 2D and 3D grids behind the [`MeshAdapter`](mesh::MeshAdapter) trait
//! - Fixed-value, fixed-flux and second/third derivative boundary constraints
//! - Exponential, upwind, central, hybrid and power-law convection schemes
//! - Fourth-order diffusion through auxiliary ghost unknowns
//! - Dense LU, preconditioned conjugate gradient and Gauss–Seidel solvers
//!
//! ## Usage
//!
//! ```rust
//! use fvm_sieve::prelude::*;
//!
//! # fn main() -> Result<(), FvmError> {
//! let mesh = Grid::grid_1d(0.1, 10)?;
//! let left = mesh.boundary_faces(Boundary::Left)?;
//! let right = mesh.boundary_faces(Boundary::Right)?;
//! let bcs = [
//!     BoundaryCondition::fixed_value(left, 0.0)?,
//!     BoundaryCondition::fixed_value(right, 1.0)?,
//! ];
//! let eq = Equation::builder().term(DiffusionTerm::new(1.0)).build()?;
//! let mut phi = CellVariable::new("phi", &mesh, 0.0);
//! eq.solve(&mut phi, &bcs, &LinearLUSolver::new())?;
//! assert!((phi.values()[0] - 0.05).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```
//!
//! ## Parallelism
//!
//! With the `rayon` feature, per-face geometry and coefficient evaluation run on
//! the rayon pool. Results are collected in face order, so assembly is
//! deterministic with or without the feature.

pub mod algs;
pub mod data;
pub mod fvm_error;
pub mod mesh;
pub mod solvers;
pub mod terms;

pub use fvm_error::FvmError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::equation::{Equation, EquationBuilder, SolveReport};
    pub use crate::algs::system::LinearSystem;
    pub use crate::data::bc::{BoundaryCondition, BoundaryMap, ConstraintKind, FaceValue};
    pub use crate::data::variable::{CellVariable, Rank};
    pub use crate::fvm_error::FvmError;
    pub use crate::mesh::{Boundary, Grid, GridSpec, MeshAdapter};
    pub use crate::solvers::{
        LinearGaussSeidelSolver, LinearLUSolver, LinearPCGSolver, LinearSolver, Solution,
        SolverConfig,
    };
    pub use crate::terms::{
        Coefficient, ConvectionScheme, ConvectionTerm, DiffusionTerm, ImplicitSourceTerm,
        SourceTerm, Term, VectorCoefficient,
    };
}
