//! Mesh adapter interface consumed by term assembly.
//!
//! Terms never own geometry; every assembly call receives a read-only
//! [`MeshAdapter`] and queries cell centers, volumes, face areas, normals and
//! adjacency by index. [`grid::Grid`] is the structured provider shipped with
//! the crate.

pub mod grid;

pub use grid::{Grid, GridSpec};

use crate::fvm_error::FvmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cartesian coordinate; unused trailing components are zero.
pub type Coord = [f64; 3];

/// Canonical named boundaries of a structured mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Minimum x.
    Left,
    /// Maximum x.
    Right,
    /// Minimum y.
    Bottom,
    /// Maximum y.
    Top,
    /// Minimum z.
    Front,
    /// Maximum z.
    Back,
}

impl Boundary {
    /// All boundaries in axis order.
    pub const ALL: [Boundary; 6] = [
        Boundary::Left,
        Boundary::Right,
        Boundary::Bottom,
        Boundary::Top,
        Boundary::Front,
        Boundary::Back,
    ];

    /// Axis normal to this boundary (0 = x, 1 = y, 2 = z).
    pub fn axis(self) -> usize {
        match self {
            Boundary::Left | Boundary::Right => 0,
            Boundary::Bottom | Boundary::Top => 1,
            Boundary::Front | Boundary::Back => 2,
        }
    }

    /// True for the maximum side along [`Boundary::axis`].
    pub fn is_upper(self) -> bool {
        matches!(self, Boundary::Right | Boundary::Top | Boundary::Back)
    }

    /// Boundary on the given side of `axis`.
    pub fn from_axis(axis: usize, upper: bool) -> Option<Self> {
        match (axis, upper) {
            (0, false) => Some(Boundary::Left),
            (0, true) => Some(Boundary::Right),
            (1, false) => Some(Boundary::Bottom),
            (1, true) => Some(Boundary::Top),
            (2, false) => Some(Boundary::Front),
            (2, true) => Some(Boundary::Back),
            _ => None,
        }
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Boundary::Left => "left",
            Boundary::Right => "right",
            Boundary::Bottom => "bottom",
            Boundary::Top => "top",
            Boundary::Front => "front",
            Boundary::Back => "back",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Boundary {
    type Err = FvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Boundary::ALL
            .into_iter()
            .find(|b| b.name() == normalized)
            .ok_or_else(|| FvmError::InvalidParameter(format!("unknown boundary name '{s}'")))
    }
}

/// The one or two cells sharing a face.
///
/// For interior faces the normal points from `owner` to `neighbor`; boundary
/// faces have no neighbor and their normal points out of the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceOwners {
    pub owner: usize,
    pub neighbor: Option<usize>,
}

impl FaceOwners {
    /// Owners of an interior face.
    pub fn interior(owner: usize, neighbor: usize) -> Self {
        Self {
            owner,
            neighbor: Some(neighbor),
        }
    }

    /// Owner of a boundary face.
    pub fn boundary(owner: usize) -> Self {
        Self {
            owner,
            neighbor: None,
        }
    }

    /// True when only one cell owns the face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.neighbor.is_none()
    }
}

/// Read-only geometry and connectivity queries over a finite-volume mesh.
///
/// Implementations must be pure: the same index always yields the same
/// answer for the lifetime of a solve. Invalid indices return
/// [`FvmError::OutOfRange`].
pub trait MeshAdapter: Send + Sync {
    /// Spatial dimension (1, 2 or 3).
    fn dimension(&self) -> usize;

    /// Number of cells `N`.
    fn cell_count(&self) -> usize;

    /// Number of faces `M`.
    fn face_count(&self) -> usize;

    /// Center of `cell`.
    fn cell_center(&self, cell: usize) -> Result<Coord, FvmError>;

    /// Volume of `cell` (length in 1D, area in 2D).
    fn cell_volume(&self, cell: usize) -> Result<f64, FvmError>;

    /// Center of `face`.
    fn face_center(&self, face: usize) -> Result<Coord, FvmError>;

    /// Area of `face` (1 in 1D, a length in 2D).
    fn face_area(&self, face: usize) -> Result<f64, FvmError>;

    /// Unit normal of `face`, oriented as described on [`FaceOwners`].
    fn face_normal(&self, face: usize) -> Result<Coord, FvmError>;

    /// Cells sharing `face`.
    fn face_owners(&self, face: usize) -> Result<FaceOwners, FvmError>;

    /// Fraction of a face-centered quantity taken from the owner, in `[0, 1]`.
    fn face_interpolation_weight(&self, face: usize) -> Result<f64, FvmError>;

    /// Faces bounding `cell`.
    fn cell_faces(&self, cell: usize) -> Result<Vec<usize>, FvmError>;

    /// Ordered boundary faces on the named side.
    fn boundary_faces(&self, boundary: Boundary) -> Result<Vec<usize>, FvmError>;

    /// True when `face` has a single owning cell.
    fn is_boundary_face(&self, face: usize) -> Result<bool, FvmError> {
        Ok(self.face_owners(face)?.is_boundary())
    }

    /// All boundary faces in ascending order.
    fn exterior_faces(&self) -> Result<Vec<usize>, FvmError> {
        let mut faces = Vec::new();
        for face in 0..self.face_count() {
            if self.is_boundary_face(face)? {
                faces.push(face);
            }
        }
        Ok(faces)
    }

    /// Distance used by face gradients: center-to-center for interior faces,
    /// owner-center-to-face-center for boundary faces.
    fn cell_distance(&self, face: usize) -> Result<f64, FvmError> {
        let owners = self.face_owners(face)?;
        let from = self.cell_center(owners.owner)?;
        let to = match owners.neighbor {
            Some(neighbor) => self.cell_center(neighbor)?,
            None => self.face_center(face)?,
        };
        let d = distance(&from, &to);
        if d > 0.0 {
            Ok(d)
        } else {
            Err(FvmError::InvalidGeometry(format!(
                "face {face} has zero distance between its owner and the opposite side"
            )))
        }
    }

    /// Centers of all cells in index order.
    fn cell_centers(&self) -> Result<Vec<Coord>, FvmError> {
        (0..self.cell_count()).map(|c| self.cell_center(c)).collect()
    }
}

/// Euclidean distance between two coordinates.
#[inline]
pub fn distance(a: &Coord, b: &Coord) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Dot product of two coordinates.
#[inline]
pub fn dot(a: &Coord, b: &Coord) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
