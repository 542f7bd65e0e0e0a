mod util;
use approx::assert_relative_eq;
use fvm_sieve::prelude::*;
use util::*;

#[test]
fn fourth_order_recovers_cubic_with_mixed_constraints() {
    let (nx, length) = (1000, 1000.0);
    let mesh = line(length, nx);
    let left = faces(&mesh, Boundary::Left);
    let right = faces(&mesh, Boundary::Right);
    let bcs = [
        BoundaryCondition::fixed_value(left.clone(), 2.0).unwrap(),
        BoundaryCondition::fixed_flux(right.clone(), 1.0).unwrap(),
        BoundaryCondition::nth_order(left, 4.0, 2).unwrap(),
        BoundaryCondition::nth_order(right, -3.0, 3).unwrap(),
    ];
    let eq = Equation::builder()
        .term(DiffusionTerm::fourth_order(1.0, 1.0))
        .build()
        .unwrap();
    let mut phi = CellVariable::new("phi", &mesh, 0.0);
    let report = eq.solve(&mut phi, &bcs, &LinearLUSolver::new()).unwrap();
    assert_eq!(report.unknowns, nx);
    assert_eq!(report.auxiliary, 2);

    let expected: Vec<f64> = centers(&mesh)
        .into_iter()
        .map(|x| -x.powi(3) / 2.0 + 2.0 * x * x + (1.0 + 1.5 * length * length - 4.0 * length) * x + 2.0)
        .collect();
    assert!(phi.all_close(&expected, 1e-4, 1e-4));
}

#[test]
fn auxiliary_unknowns_extend_the_system() {
    let mesh = line(1.0, 6);
    let bcs = [
        BoundaryCondition::fixed_value(faces(&mesh, Boundary::Left), 0.0).unwrap(),
        BoundaryCondition::fixed_value(faces(&mesh, Boundary::Right), 0.0).unwrap(),
        BoundaryCondition::nth_order(faces(&mesh, Boundary::Right), 1.0, 2).unwrap(),
    ];
    let eq = Equation::from(DiffusionTerm::fourth_order(1.0, 1.0));
    let system = eq.assemble(&mesh, &bcs).unwrap();
    assert_eq!(system.size(), 7);
    assert_eq!(system.auxiliary().len(), 1);
    assert_eq!(system.auxiliary().index_of(6), Some(6));

    // Ghost row: (ψ_g + ψ_o) / 2 = D g.
    let dense = system.to_dense();
    assert_relative_eq!(dense[6][6], 0.5);
    assert!(dense[6][5] != 0.0);
}

#[test]
fn fourth_order_without_higher_constraints_is_closed() {
    let mesh = line(1.0, 8);
    let eq = Equation::from(DiffusionTerm::fourth_order(1.0, 1.0));
    let system = eq.assemble(&mesh, &dirichlet(&mesh, 0.0, 1.0)).unwrap();
    assert_eq!(system.size(), 8);
    assert!(system.auxiliary().is_empty());
}
