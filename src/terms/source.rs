//! Volumetric sources.

use super::AssemblyContext;
use super::coefficient::Coefficient;
use crate::algs::system::LinearSystem;
use crate::fvm_error::FvmError;
use serde::{Deserialize, Serialize};

/// Explicit source `S`, adding `S_i V_i` to the right-hand side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceTerm {
    strength: Coefficient,
}

impl SourceTerm {
    /// Same strength in every cell.
    pub fn constant(value: f64) -> Self {
        Self {
            strength: Coefficient::Uniform(value),
        }
    }

    /// One value per cell; the length is checked at assembly.
    pub fn per_cell(values: Vec<f64>) -> Self {
        Self {
            strength: Coefficient::PerCell(values),
        }
    }

    #[inline]
    pub fn strength(&self) -> &Coefficient {
        &self.strength
    }

    pub(crate) fn assemble(
        &self,
        ctx: &AssemblyContext<'_>,
        system: &mut LinearSystem,
    ) -> Result<(), FvmError> {
        self.strength.validate(ctx.mesh())?;
        for (cell, volume) in ctx.volumes().iter().enumerate() {
            let s = self.strength.at_cell(ctx, cell)?;
            system.add_rhs(cell, s * volume);
        }
        Ok(())
    }
}

/// Implicit source `s φ`, adding `−s_i V_i` to the diagonal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImplicitSourceTerm {
    coefficient: Coefficient,
}

impl ImplicitSourceTerm {
    /// Implicit source with coefficient `s`.
    pub fn new(coefficient: impl Into<Coefficient>) -> Self {
        Self {
            coefficient: coefficient.into(),
        }
    }

    #[inline]
    pub fn coefficient(&self) -> &Coefficient {
        &self.coefficient
    }

    pub(crate) fn assemble(
        &self,
        ctx: &AssemblyContext<'_>,
        system: &mut LinearSystem,
    ) -> Result<(), FvmError> {
        self.coefficient.validate(ctx.mesh())?;
        for (cell, volume) in ctx.volumes().iter().enumerate() {
            let s = self.coefficient.at_cell(ctx, cell)?;
            system.add(cell, cell, -s * volume);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BoundaryMap;
    use crate::mesh::Grid;

    #[test]
    fn sources_scale_with_volume() {
        let mesh = Grid::grid_1d(0.5, 3).unwrap();
        let map = BoundaryMap::default();
        let ctx = AssemblyContext::new(&mesh, &map, &[]).unwrap();
        let mut system = LinearSystem::new(3);

        SourceTerm::per_cell(vec![1.0, 2.0, 4.0])
            .assemble(&ctx, &mut system)
            .unwrap();
        ImplicitSourceTerm::new(-2.0).assemble(&ctx, &mut system).unwrap();

        assert_eq!(system.rhs(), &[0.5, 1.0, 2.0]);
        let a = system.to_dense();
        assert_eq!(a[1], vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn per_cell_length_is_checked() {
        let mesh = Grid::grid_1d(1.0, 3).unwrap();
        let map = BoundaryMap::default();
        let ctx = AssemblyContext::new(&mesh, &map, &[]).unwrap();
        let mut system = LinearSystem::new(3);
        assert_eq!(
            SourceTerm::per_cell(vec![1.0; 2]).assemble(&ctx, &mut system),
            Err(FvmError::ShapeMismatch {
                what: "cell coefficient",
                expected: 3,
                found: 2
            })
        );
    }
}
