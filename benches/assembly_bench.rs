use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use fvm_sieve::prelude::*;

fn convection_diffusion() -> Equation {
    Equation::builder()
        .term(DiffusionTerm::new(1.0))
        .term(ConvectionTerm::new(vec![10.0, 0.0]))
        .term(SourceTerm::constant(1.0))
        .build()
        .expect("valid equation")
}

fn boundary_conditions(mesh: &Grid) -> Vec<BoundaryCondition> {
    vec![
        BoundaryCondition::on_boundary(mesh, Boundary::Left, ConstraintKind::FixedValue, 0.0)
            .expect("left boundary"),
        BoundaryCondition::on_boundary(mesh, Boundary::Right, ConstraintKind::FixedValue, 1.0)
            .expect("right boundary"),
    ]
}

fn bench_assembly(c: &mut Criterion) {
    let eq = convection_diffusion();
    let mut group = c.benchmark_group("assemble_2d");
    for n in [16usize, 64, 128] {
        let mesh = Grid::grid_2d(1.0 / n as f64, 1.0 / n as f64, n, n).expect("grid");
        let bcs = boundary_conditions(&mesh);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let system = eq.assemble(black_box(&mesh), black_box(&bcs)).expect("assemble");
                black_box(system.to_csr());
            })
        });
    }
    group.finish();
}

fn bench_solvers(c: &mut Criterion) {
    let eq = Equation::builder()
        .term(DiffusionTerm::new(1.0))
        .term(SourceTerm::constant(1.0))
        .build()
        .expect("valid equation");
    let n = 48;
    let mesh = Grid::grid_2d(1.0 / n as f64, 1.0 / n as f64, n, n).expect("grid");
    let bcs = boundary_conditions(&mesh);
    let matrix = eq.assemble(&mesh, &bcs).expect("assemble");
    let csr = matrix.to_csr();
    let guess = vec![0.0; matrix.size()];

    let mut group = c.benchmark_group("solve_2d");
    group.bench_function("pcg", |b| {
        let solver = LinearPCGSolver::new();
        b.iter(|| solver.solve(black_box(&csr), matrix.rhs(), &guess).expect("pcg"))
    });
    group.bench_function("lu", |b| {
        let solver = LinearLUSolver::new();
        b.iter(|| solver.solve(black_box(&csr), matrix.rhs(), &guess).expect("lu"))
    });
    group.finish();
}

criterion_group!(benches, bench_assembly, bench_solvers);
criterion_main!(benches);
