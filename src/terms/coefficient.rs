//! Scalar and vector coefficients evaluated at faces.

use super::{AssemblyContext, FaceGeometry};
use crate::fvm_error::{FvmError, ensure_len};
use crate::mesh::{MeshAdapter, dot};
use serde::{Deserialize, Serialize};

/// Scalar coefficient of a term.
///
/// Cell values are interpolated to faces with the mesh's interpolation
/// weight; boundary faces take the owner's value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coefficient {
    /// Same value everywhere.
    Uniform(f64),
    /// One value per cell.
    PerCell(Vec<f64>),
    /// One value per face, used as is.
    PerFace(Vec<f64>),
}

impl Default for Coefficient {
    fn default() -> Self {
        Coefficient::Uniform(1.0)
    }
}

impl From<f64> for Coefficient {
    fn from(v: f64) -> Self {
        Coefficient::Uniform(v)
    }
}

impl Coefficient {
    /// Check array lengths against the mesh.
    pub fn validate(&self, mesh: &dyn MeshAdapter) -> Result<(), FvmError> {
        match self {
            Coefficient::Uniform(_) => Ok(()),
            Coefficient::PerCell(v) => ensure_len("cell coefficient", mesh.cell_count(), v.len()),
            Coefficient::PerFace(v) => ensure_len("face coefficient", mesh.face_count(), v.len()),
        }
    }

    /// Value on one face.
    pub(crate) fn at_face(&self, geometry: &FaceGeometry) -> f64 {
        match self {
            Coefficient::Uniform(v) => *v,
            Coefficient::PerFace(v) => v[geometry.face],
            Coefficient::PerCell(v) => match geometry.neighbor {
                Some(n) => geometry.weight * v[geometry.owner] + (1.0 - geometry.weight) * v[n],
                None => v[geometry.owner],
            },
        }
    }

    /// Value in one cell; face coefficients average their cell's faces.
    pub(crate) fn at_cell(&self, ctx: &AssemblyContext<'_>, cell: usize) -> Result<f64, FvmError> {
        Ok(match self {
            Coefficient::Uniform(v) => *v,
            Coefficient::PerCell(v) => v[cell],
            Coefficient::PerFace(v) => {
                let faces = ctx.mesh().cell_faces(cell)?;
                if faces.is_empty() {
                    0.0
                } else {
                    faces.iter().map(|&f| v[f]).sum::<f64>() / faces.len() as f64
                }
            }
        })
    }

    /// Values on every face of the context's mesh.
    pub(crate) fn face_values(&self, ctx: &AssemblyContext<'_>) -> Result<Vec<f64>, FvmError> {
        self.validate(ctx.mesh())?;
        Ok(ctx.faces().iter().map(|g| self.at_face(g)).collect())
    }
}

/// Velocity-like coefficient projected onto face normals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorCoefficient {
    /// Constant vector with one component per mesh dimension.
    Uniform(Vec<f64>),
    /// Precomputed `u·n` per face.
    FaceNormal(Vec<f64>),
}

impl VectorCoefficient {
    /// Check the component count or face array length against the mesh.
    pub fn validate(&self, mesh: &dyn MeshAdapter) -> Result<(), FvmError> {
        match self {
            VectorCoefficient::Uniform(u) => ensure_len("velocity components", mesh.dimension(), u.len()),
            VectorCoefficient::FaceNormal(v) => {
                ensure_len("face normal velocity", mesh.face_count(), v.len())
            }
        }
    }

    /// Normal component `u·n` on every face.
    pub(crate) fn normal_fluxes(&self, ctx: &AssemblyContext<'_>) -> Result<Vec<f64>, FvmError> {
        self.validate(ctx.mesh())?;
        Ok(match self {
            VectorCoefficient::Uniform(u) => {
                let mut full = [0.0; 3];
                full[..u.len()].copy_from_slice(u);
                ctx.faces().iter().map(|g| dot(&full, &g.normal)).collect()
            }
            VectorCoefficient::FaceNormal(v) => v.clone(),
        })
    }
}

impl From<f64> for VectorCoefficient {
    fn from(u: f64) -> Self {
        VectorCoefficient::Uniform(vec![u])
    }
}

impl From<Vec<f64>> for VectorCoefficient {
    fn from(u: Vec<f64>) -> Self {
        VectorCoefficient::Uniform(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BoundaryMap;
    use crate::mesh::Grid;

    #[test]
    fn cell_values_are_interpolated_to_faces() {
        let mesh = Grid::grid_1d(1.0, 3).unwrap();
        let map = BoundaryMap::default();
        let ctx = AssemblyContext::new(&mesh, &map, &[]).unwrap();
        let c = Coefficient::PerCell(vec![1.0, 3.0, 5.0]);
        assert_eq!(c.face_values(&ctx).unwrap(), vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(c.at_cell(&ctx, 1).unwrap(), 3.0);

        let f = Coefficient::PerFace(vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(f.at_cell(&ctx, 1).unwrap(), 3.0);

        let bad = Coefficient::PerCell(vec![1.0]);
        assert!(matches!(bad.face_values(&ctx), Err(FvmError::ShapeMismatch { .. })));
    }

    #[test]
    fn velocity_is_projected_on_normals() {
        let mesh = Grid::grid_2d(1.0, 1.0, 1, 1).unwrap();
        let map = BoundaryMap::default();
        let ctx = AssemblyContext::new(&mesh, &map, &[]).unwrap();
        let u = VectorCoefficient::Uniform(vec![2.0, -1.0]);
        // left, right, bottom, top
        assert_eq!(u.normal_fluxes(&ctx).unwrap(), vec![-2.0, 2.0, 1.0, -1.0]);

        let wrong = VectorCoefficient::from(1.0);
        assert_eq!(
            wrong.normal_fluxes(&ctx),
            Err(FvmError::ShapeMismatch {
                what: "velocity components",
                expected: 2,
                found: 1
            })
        );
    }
}
