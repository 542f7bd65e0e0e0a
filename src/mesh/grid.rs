//! Uniform structured grids in one, two and three dimensions.
//!
//! Cells are numbered x-fastest. Faces are grouped by normal axis (all
//! x-normal faces first, then y, then z); inside each family the numbering is
//! again x-fastest over the family's index box.

use super::{Boundary, Coord, FaceOwners, MeshAdapter};
use crate::fvm_error::FvmError;
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serializable description of a uniform grid.
///
/// `shape` and `spacing` have one entry per dimension. `origin` defaults to
/// zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub shape: Vec<usize>,
    pub spacing: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<f64>>,
}

impl GridSpec {
    /// Grid of `nx` cells of width `dx`.
    pub fn line(dx: f64, nx: usize) -> Self {
        Self {
            shape: vec![nx],
            spacing: vec![dx],
            origin: None,
        }
    }
}

/// Uniform orthogonal grid implementing [`MeshAdapter`].
#[derive(Clone, Debug)]
pub struct Grid {
    dimension: usize,
    /// Cells per axis; inactive axes hold 1.
    shape: [usize; 3],
    /// Spacing per axis; inactive axes hold 1 so face areas stay products.
    spacing: [f64; 3],
    origin: Coord,
    /// First face index of each axis family, plus the total.
    family_start: [usize; 4],
    owners: Vec<FaceOwners>,
    boundaries: BTreeMap<Boundary, Vec<usize>>,
}

fn invalid_geometry(message: impl Into<String>) -> FvmError {
    FvmError::InvalidGeometry(message.into())
}

impl Grid {
    /// One-dimensional grid of `nx` cells of width `dx`.
    pub fn grid_1d(dx: f64, nx: usize) -> Result<Self, FvmError> {
        Self::build(&[nx], &[dx], None)
    }

    /// Two-dimensional grid of `nx × ny` cells.
    pub fn grid_2d(dx: f64, dy: f64, nx: usize, ny: usize) -> Result<Self, FvmError> {
        Self::build(&[nx, ny], &[dx, dy], None)
    }

    /// Three-dimensional grid of `nx × ny × nz` cells.
    pub fn grid_3d(
        spacing: [f64; 3],
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> Result<Self, FvmError> {
        Self::build(&[nx, ny, nz], &spacing, None)
    }

    /// Grid described by a [`GridSpec`].
    pub fn from_spec(spec: &GridSpec) -> Result<Self, FvmError> {
        Self::build(&spec.shape, &spec.spacing, spec.origin.as_deref())
    }

    fn build(shape: &[usize], spacing: &[f64], origin: Option<&[f64]>) -> Result<Self, FvmError> {
        let dimension = shape.len();
        if !(1..=3).contains(&dimension) {
            return Err(invalid_geometry(format!(
                "grid dimension must be 1, 2 or 3, got {dimension}"
            )));
        }
        if spacing.len() != dimension {
            return Err(invalid_geometry(format!(
                "grid has {dimension} axes but {} spacings",
                spacing.len()
            )));
        }
        if let Some(origin) = origin {
            if origin.len() != dimension {
                return Err(invalid_geometry(format!(
                    "grid has {dimension} axes but origin has {} components",
                    origin.len()
                )));
            }
        }

        let mut full_shape = [1usize; 3];
        let mut full_spacing = [1.0f64; 3];
        let mut full_origin = [0.0f64; 3];
        for axis in 0..dimension {
            if shape[axis] == 0 {
                return Err(invalid_geometry(format!("axis {axis} has no cells")));
            }
            let h = spacing[axis];
            if !(h.is_finite() && h > 0.0) {
                return Err(invalid_geometry(format!(
                    "axis {axis} spacing must be positive and finite, got {h}"
                )));
            }
            full_shape[axis] = shape[axis];
            full_spacing[axis] = h;
            if let Some(origin) = origin {
                full_origin[axis] = origin[axis];
            }
        }

        let mut grid = Grid {
            dimension,
            shape: full_shape,
            spacing: full_spacing,
            origin: full_origin,
            family_start: [0; 4],
            owners: Vec::new(),
            boundaries: BTreeMap::new(),
        };

        let mut start = 0;
        for axis in 0..3 {
            grid.family_start[axis] = start;
            if axis < dimension {
                start += grid.family_dims(axis).iter().product::<usize>();
            }
        }
        grid.family_start[3] = start;

        grid.owners.reserve(start);
        for axis in 0..dimension {
            let dims = grid.family_dims(axis);
            for (k, j, i) in iproduct!(0..dims[2], 0..dims[1], 0..dims[0]) {
                let mut index = [i, j, k];
                let along = index[axis];
                let n = grid.shape[axis];
                let face = grid.owners.len();
                let owners = if along == 0 {
                    grid.boundaries
                        .entry(Boundary::from_axis(axis, false).ok_or_else(|| {
                            invalid_geometry(format!("axis {axis} has no boundary"))
                        })?)
                        .or_default()
                        .push(face);
                    FaceOwners::boundary(grid.cell_index(index))
                } else if along == n {
                    index[axis] = n - 1;
                    grid.boundaries
                        .entry(Boundary::from_axis(axis, true).ok_or_else(|| {
                            invalid_geometry(format!("axis {axis} has no boundary"))
                        })?)
                        .or_default()
                        .push(face);
                    FaceOwners::boundary(grid.cell_index(index))
                } else {
                    let neighbor = grid.cell_index(index);
                    index[axis] = along - 1;
                    FaceOwners::interior(grid.cell_index(index), neighbor)
                };
                grid.owners.push(owners);
            }
        }

        log::debug!(
            "built {}D grid: {} cells, {} faces",
            dimension,
            grid.cell_count(),
            grid.owners.len()
        );
        Ok(grid)
    }

    /// Cells per active axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape[..self.dimension]
    }

    /// Spacing per active axis.
    pub fn spacing(&self) -> &[f64] {
        &self.spacing[..self.dimension]
    }

    /// Lower corner of the domain.
    pub fn origin(&self) -> &[f64] {
        &self.origin[..self.dimension]
    }

    /// Description that rebuilds this grid.
    pub fn spec(&self) -> GridSpec {
        GridSpec {
            shape: self.shape().to_vec(),
            spacing: self.spacing().to_vec(),
            origin: Some(self.origin().to_vec()),
        }
    }

    /// Index box of the faces normal to `axis`.
    fn family_dims(&self, axis: usize) -> [usize; 3] {
        let mut dims = self.shape;
        dims[axis] += 1;
        dims
    }

    #[inline]
    fn cell_index(&self, [i, j, k]: [usize; 3]) -> usize {
        i + self.shape[0] * (j + self.shape[1] * k)
    }

    #[inline]
    fn cell_ijk(&self, cell: usize) -> [usize; 3] {
        let i = cell % self.shape[0];
        let rest = cell / self.shape[0];
        [i, rest % self.shape[1], rest / self.shape[1]]
    }

    /// Axis and family-local index triple of `face`.
    fn face_ijk(&self, face: usize) -> Result<(usize, [usize; 3]), FvmError> {
        for axis in 0..self.dimension {
            if face < self.family_start[axis + 1] {
                let local = face - self.family_start[axis];
                let dims = self.family_dims(axis);
                let i = local % dims[0];
                let rest = local / dims[0];
                return Ok((axis, [i, rest % dims[1], rest / dims[1]]));
            }
        }
        Err(FvmError::face_out_of_range(face, self.face_count()))
    }

    fn face_index(&self, axis: usize, [i, j, k]: [usize; 3]) -> usize {
        let dims = self.family_dims(axis);
        self.family_start[axis] + i + dims[0] * (j + dims[1] * k)
    }

    fn check_cell(&self, cell: usize) -> Result<(), FvmError> {
        let count = self.cell_count();
        if cell < count {
            Ok(())
        } else {
            Err(FvmError::cell_out_of_range(cell, count))
        }
    }

    fn owners_of(&self, face: usize) -> Result<&FaceOwners, FvmError> {
        self.owners
            .get(face)
            .ok_or_else(|| FvmError::face_out_of_range(face, self.owners.len()))
    }
}

impl MeshAdapter for Grid {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn cell_count(&self) -> usize {
        self.shape.iter().product()
    }

    fn face_count(&self) -> usize {
        self.family_start[3]
    }

    fn cell_center(&self, cell: usize) -> Result<Coord, FvmError> {
        self.check_cell(cell)?;
        let ijk = self.cell_ijk(cell);
        let mut center = [0.0; 3];
        for axis in 0..self.dimension {
            center[axis] = self.origin[axis] + (ijk[axis] as f64 + 0.5) * self.spacing[axis];
        }
        Ok(center)
    }

    fn cell_volume(&self, cell: usize) -> Result<f64, FvmError> {
        self.check_cell(cell)?;
        Ok(self.spacing.iter().product())
    }

    fn face_center(&self, face: usize) -> Result<Coord, FvmError> {
        let (normal_axis, ijk) = self.face_ijk(face)?;
        let mut center = [0.0; 3];
        for axis in 0..self.dimension {
            let offset = if axis == normal_axis { 0.0 } else { 0.5 };
            center[axis] = self.origin[axis] + (ijk[axis] as f64 + offset) * self.spacing[axis];
        }
        Ok(center)
    }

    fn face_area(&self, face: usize) -> Result<f64, FvmError> {
        let (normal_axis, _) = self.face_ijk(face)?;
        Ok(self
            .spacing
            .iter()
            .enumerate()
            .filter(|(axis, _)| *axis != normal_axis)
            .map(|(_, h)| h)
            .product())
    }

    fn face_normal(&self, face: usize) -> Result<Coord, FvmError> {
        let (axis, ijk) = self.face_ijk(face)?;
        let mut normal = [0.0; 3];
        normal[axis] = if ijk[axis] == 0 { -1.0 } else { 1.0 };
        Ok(normal)
    }

    fn face_owners(&self, face: usize) -> Result<FaceOwners, FvmError> {
        self.owners_of(face).copied()
    }

    fn face_interpolation_weight(&self, face: usize) -> Result<f64, FvmError> {
        Ok(if self.owners_of(face)?.is_boundary() {
            1.0
        } else {
            0.5
        })
    }

    fn cell_faces(&self, cell: usize) -> Result<Vec<usize>, FvmError> {
        self.check_cell(cell)?;
        let ijk = self.cell_ijk(cell);
        let mut faces = Vec::with_capacity(2 * self.dimension);
        for axis in 0..self.dimension {
            let mut upper = ijk;
            upper[axis] += 1;
            faces.push(self.face_index(axis, ijk));
            faces.push(self.face_index(axis, upper));
        }
        Ok(faces)
    }

    fn boundary_faces(&self, boundary: Boundary) -> Result<Vec<usize>, FvmError> {
        self.boundaries
            .get(&boundary)
            .cloned()
            .ok_or(FvmError::UnknownBoundary {
                boundary,
                dimension: self.dimension,
            })
    }

    fn cell_distance(&self, face: usize) -> Result<f64, FvmError> {
        let (axis, _) = self.face_ijk(face)?;
        let h = self.spacing[axis];
        Ok(if self.owners_of(face)?.is_boundary() {
            0.5 * h
        } else {
            h
        })
    }
}
