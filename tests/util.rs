#![allow(dead_code)]

use fvm_sieve::prelude::*;

pub fn line(length: f64, nx: usize) -> Grid {
    Grid::grid_1d(length / nx as f64, nx).unwrap()
}

pub fn centers(mesh: &dyn MeshAdapter) -> Vec<f64> {
    mesh.cell_centers().unwrap().iter().map(|c| c[0]).collect()
}

pub fn faces(mesh: &dyn MeshAdapter, boundary: Boundary) -> Vec<usize> {
    mesh.boundary_faces(boundary).unwrap()
}

/// Fixed values on the left and right ends of a line.
pub fn dirichlet(mesh: &dyn MeshAdapter, left: f64, right: f64) -> Vec<BoundaryCondition> {
    vec![
        BoundaryCondition::fixed_value(faces(mesh, Boundary::Left), left).unwrap(),
        BoundaryCondition::fixed_value(faces(mesh, Boundary::Right), right).unwrap(),
    ]
}

pub fn is_symmetric(dense: &[Vec<f64>], tol: f64) -> bool {
    (0..dense.len()).all(|i| (0..dense.len()).all(|j| (dense[i][j] - dense[j][i]).abs() <= tol))
}
