//! Data module: cell variables and boundary conditions
#![warn(missing_docs)]

pub mod bc;
pub mod variable;

pub use bc::{BoundaryCondition, BoundaryMap, ConstraintKind, FaceConstraints, FaceValue};
pub use variable::{CellVariable, Rank};
