mod util;
use fvm_sieve::prelude::*;
use proptest::prelude::*;
use util::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn diffusion_matrix_is_symmetric_with_zero_row_sums(
        coefficients in prop::collection::vec(0.01f64..100.0, 12),
    ) {
        let mesh = Grid::grid_2d(0.5, 2.0, 4, 3).unwrap();
        let eq = Equation::from(DiffusionTerm::new(Coefficient::PerCell(coefficients)));
        let system = eq.assemble(&mesh, &[]).unwrap();
        let dense = system.to_dense();
        prop_assert!(is_symmetric(&dense, 1e-9));
        for row in &dense {
            let sum: f64 = row.iter().sum();
            let scale: f64 = row.iter().map(|v| v.abs()).sum();
            prop_assert!(sum.abs() <= 1e-12 * scale.max(1.0));
        }
    }

    #[test]
    fn fixed_values_keep_symmetry_and_dominance(
        coefficients in prop::collection::vec(0.01f64..100.0, 8),
        left in -10.0f64..10.0,
        right in -10.0f64..10.0,
    ) {
        let mesh = line(1.0, 8);
        let eq = Equation::from(DiffusionTerm::new(Coefficient::PerCell(coefficients)));
        let system = eq.assemble(&mesh, &dirichlet(&mesh, left, right)).unwrap();
        let dense = system.to_dense();
        prop_assert!(is_symmetric(&dense, 1e-9));
        for (i, row) in dense.iter().enumerate() {
            let off: f64 = row.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, v)| v.abs()).sum();
            prop_assert!(row[i] >= off * (1.0 - 1e-12));
        }
    }

    #[test]
    fn solution_is_bounded_by_boundary_values(
        left in -5.0f64..5.0,
        right in -5.0f64..5.0,
        d in 0.1f64..10.0,
    ) {
        let mesh = line(1.0, 16);
        let eq = Equation::from(DiffusionTerm::new(d));
        let mut phi = CellVariable::new("phi", &mesh, 0.0);
        eq.solve(&mut phi, &dirichlet(&mesh, left, right), &LinearLUSolver::new()).unwrap();
        let (lo, hi) = (left.min(right) - 1e-9, left.max(right) + 1e-9);
        prop_assert!(phi.values().iter().all(|v| (lo..=hi).contains(v)));
    }
}
