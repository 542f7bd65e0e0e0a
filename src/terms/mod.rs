//! Discretized operator terms.
//!
//! Each term adds its contribution to a shared [`LinearSystem`]. Terms hold
//! only coefficients; the mesh and resolved boundary conditions arrive through
//! an [`AssemblyContext`] built once per assembly.

pub mod coefficient;
pub mod convection;
pub mod diffusion;
pub mod source;

pub use coefficient::{Coefficient, VectorCoefficient};
pub use convection::{ConvectionScheme, ConvectionTerm};
pub use diffusion::DiffusionTerm;
pub use source::{ImplicitSourceTerm, SourceTerm};

use crate::algs::system::LinearSystem;
use crate::data::bc::BoundaryMap;
use crate::fvm_error::FvmError;
use crate::mesh::{Coord, MeshAdapter};
use serde::{Deserialize, Serialize};

/// Geometry of one face as seen by the stencils.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceGeometry {
    pub face: usize,
    pub owner: usize,
    pub neighbor: Option<usize>,
    pub area: f64,
    /// Center-to-center distance, or owner-center-to-face for boundary faces.
    pub distance: f64,
    pub normal: Coord,
    pub weight: f64,
}

impl FaceGeometry {
    fn query(mesh: &dyn MeshAdapter, face: usize) -> Result<Self, FvmError> {
        let owners = mesh.face_owners(face)?;
        Ok(Self {
            face,
            owner: owners.owner,
            neighbor: owners.neighbor,
            area: mesh.face_area(face)?,
            distance: mesh.cell_distance(face)?,
            normal: mesh.face_normal(face)?,
            weight: mesh.face_interpolation_weight(face)?,
        })
    }
}

/// Evaluate `f` for every face index, in parallel under the `rayon` feature.
///
/// Results come back in face order either way.
pub(crate) fn map_faces<T, F>(count: usize, f: F) -> Result<Vec<T>, FvmError>
where
    T: Send,
    F: Fn(usize) -> Result<T, FvmError> + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..count).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        (0..count).map(f).collect()
    }
}

/// Mesh, boundary conditions and per-face data shared by every term of one
/// assembly.
pub struct AssemblyContext<'a> {
    mesh: &'a dyn MeshAdapter,
    boundaries: &'a BoundaryMap,
    faces: Vec<FaceGeometry>,
    volumes: Vec<f64>,
    diffusivity: Vec<f64>,
}

impl<'a> AssemblyContext<'a> {
    /// Gather face geometry and the summed second-order diffusivity of `terms`.
    pub fn new(
        mesh: &'a dyn MeshAdapter,
        boundaries: &'a BoundaryMap,
        terms: &[Term],
    ) -> Result<Self, FvmError> {
        let faces = map_faces(mesh.face_count(), |face| FaceGeometry::query(mesh, face))?;
        let volumes = (0..mesh.cell_count())
            .map(|c| mesh.cell_volume(c))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(cell) = volumes.iter().position(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(FvmError::InvalidGeometry(format!(
                "cell {cell} has non-positive volume {}",
                volumes[cell]
            )));
        }
        let mut ctx = Self {
            mesh,
            boundaries,
            faces,
            volumes,
            diffusivity: Vec::new(),
        };
        let mut diffusivity = vec![0.0; ctx.faces.len()];
        for term in terms {
            if let Term::Diffusion(DiffusionTerm::SecondOrder(coefficient)) = term {
                for (d, v) in diffusivity.iter_mut().zip(coefficient.face_values(&ctx)?) {
                    *d += v;
                }
            }
        }
        ctx.diffusivity = diffusivity;
        Ok(ctx)
    }

    #[inline]
    pub fn mesh(&self) -> &'a dyn MeshAdapter {
        self.mesh
    }

    #[inline]
    pub fn boundaries(&self) -> &'a BoundaryMap {
        self.boundaries
    }

    #[inline]
    pub fn faces(&self) -> &[FaceGeometry] {
        &self.faces
    }

    #[inline]
    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Sum of second-order diffusion coefficients on `face`.
    #[inline]
    pub fn diffusivity_at(&self, face: usize) -> f64 {
        self.diffusivity.get(face).copied().unwrap_or(0.0)
    }
}

/// Closed set of operator terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Diffusion(DiffusionTerm),
    Convection(ConvectionTerm),
    Source(SourceTerm),
    ImplicitSource(ImplicitSourceTerm),
}

impl Term {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Term::Diffusion(DiffusionTerm::SecondOrder(_)) => "diffusion",
            Term::Diffusion(DiffusionTerm::FourthOrder { .. }) => "fourth-order diffusion",
            Term::Convection(_) => "convection",
            Term::Source(_) => "source",
            Term::ImplicitSource(_) => "implicit source",
        }
    }

    /// Add this term's contribution to `system`.
    pub fn assemble(&self, ctx: &AssemblyContext<'_>, system: &mut LinearSystem) -> Result<(), FvmError> {
        log::trace!("assembling {} term", self.name());
        match self {
            Term::Diffusion(t) => t.assemble(ctx, system),
            Term::Convection(t) => t.assemble(ctx, system),
            Term::Source(t) => t.assemble(ctx, system),
            Term::ImplicitSource(t) => t.assemble(ctx, system),
        }
    }
}

impl From<DiffusionTerm> for Term {
    fn from(t: DiffusionTerm) -> Self {
        Term::Diffusion(t)
    }
}

impl From<ConvectionTerm> for Term {
    fn from(t: ConvectionTerm) -> Self {
        Term::Convection(t)
    }
}

impl From<SourceTerm> for Term {
    fn from(t: SourceTerm) -> Self {
        Term::Source(t)
    }
}

impl From<ImplicitSourceTerm> for Term {
    fn from(t: ImplicitSourceTerm) -> Self {
        Term::ImplicitSource(t)
    }
}
