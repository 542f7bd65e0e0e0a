mod util;
use approx::assert_relative_eq;
use fvm_sieve::prelude::*;
use util::*;

/// Max error of `φ'' + 1 = 0`, `φ(0) = 0`, `φ'(L) = 0` against `x(2L − x)/2`.
fn poisson_error(nx: usize) -> f64 {
    let length = 1.0;
    let mesh = line(length, nx);
    let bcs = [
        BoundaryCondition::fixed_value(faces(&mesh, Boundary::Left), 0.0).unwrap(),
        BoundaryCondition::fixed_flux(faces(&mesh, Boundary::Right), 0.0).unwrap(),
    ];
    let eq = Equation::builder()
        .term(DiffusionTerm::new(1.0))
        .term(SourceTerm::constant(1.0))
        .build()
        .unwrap();
    let mut phi = CellVariable::new("phi", &mesh, 0.0);
    eq.solve(&mut phi, &bcs, &LinearLUSolver::new()).unwrap();
    centers(&mesh)
        .iter()
        .zip(phi.values())
        .map(|(x, v)| (v - x * (2.0 * length - x) / 2.0).abs())
        .fold(0.0, f64::max)
}

#[test]
fn second_order_convergence_under_refinement() {
    let errors: Vec<f64> = [10, 20, 40].into_iter().map(poisson_error).collect();
    for pair in errors.windows(2) {
        let ratio = pair[0] / pair[1];
        assert!((3.0..5.0).contains(&ratio), "ratio {ratio} from {errors:?}");
    }
}

#[test]
fn fixed_flux_enters_the_balance() {
    // φ'' = 0, φ(0) = 1 and outward derivative 2 at x = 1 give φ = 1 + 2x.
    let mesh = line(1.0, 8);
    let bcs = [
        BoundaryCondition::fixed_value(faces(&mesh, Boundary::Left), 1.0).unwrap(),
        BoundaryCondition::fixed_flux(faces(&mesh, Boundary::Right), 2.0).unwrap(),
    ];
    let eq = Equation::from(DiffusionTerm::new(3.0));
    let mut phi = CellVariable::new("phi", &mesh, 0.0);
    eq.solve(&mut phi, &bcs, &LinearLUSolver::new()).unwrap();
    for (x, v) in centers(&mesh).iter().zip(phi.values()) {
        assert_relative_eq!(*v, 1.0 + 2.0 * x, epsilon = 1e-10);
    }
}

#[test]
fn two_dimensional_grid_gives_planar_profile() {
    let mesh = Grid::grid_2d(0.25, 0.5, 4, 3).unwrap();
    let bcs = [
        BoundaryCondition::on_boundary(&mesh, Boundary::Left, ConstraintKind::FixedValue, 0.0)
            .unwrap(),
        BoundaryCondition::on_boundary(&mesh, Boundary::Right, ConstraintKind::FixedValue, 1.0)
            .unwrap(),
    ];
    let eq = Equation::from(DiffusionTerm::new(1.0));
    let mut phi = CellVariable::new("phi", &mesh, 0.0);
    eq.solve(&mut phi, &bcs, &LinearPCGSolver::new()).unwrap();
    let centers = mesh.cell_centers().unwrap();
    for (c, v) in centers.iter().zip(phi.values()) {
        assert_relative_eq!(*v, c[0], epsilon = 1e-8);
    }
}

#[test]
fn three_dimensional_grid_gives_planar_profile() {
    let mesh = Grid::grid_3d([0.5, 1.0, 1.0], 2, 2, 4).unwrap();
    let bcs = [
        BoundaryCondition::on_boundary(&mesh, Boundary::Front, ConstraintKind::FixedValue, 2.0)
            .unwrap(),
        BoundaryCondition::on_boundary(&mesh, Boundary::Back, ConstraintKind::FixedValue, 6.0)
            .unwrap(),
    ];
    let eq = Equation::from(DiffusionTerm::new(1.0));
    let mut phi = CellVariable::new("phi", &mesh, 0.0);
    eq.solve(&mut phi, &bcs, &LinearLUSolver::new()).unwrap();
    let centers = mesh.cell_centers().unwrap();
    for (c, v) in centers.iter().zip(phi.values()) {
        assert_relative_eq!(*v, 2.0 + c[2], epsilon = 1e-9);
    }
}
