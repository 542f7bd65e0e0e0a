//! Equation assembly and the linear system it produces.

pub mod equation;
pub mod higher_order;
pub mod system;

pub use equation::{Equation, EquationBuilder, SolveReport};
pub use higher_order::{AuxiliaryArena, AuxiliaryUnknown, assemble_auxiliary_rows};
pub use system::{BoundaryCoefficients, LinearSystem};
