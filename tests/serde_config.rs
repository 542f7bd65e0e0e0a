use fvm_sieve::prelude::*;

#[test]
fn solver_config_fills_defaults() {
    let config: SolverConfig = serde_json::from_str(r#"{"tolerance":1e-6}"#).unwrap();
    assert_eq!(config.tolerance, 1e-6);
    assert_eq!(config.max_iterations, SolverConfig::default().max_iterations);

    let json = serde_json::to_string(&config).unwrap();
    let back: SolverConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn grid_spec_builds_equivalent_grid() {
    let spec: GridSpec =
        serde_json::from_str(r#"{"shape":[3,2],"spacing":[0.5,1.0],"origin":[1.0,-1.0]}"#).unwrap();
    let grid = Grid::from_spec(&spec).unwrap();
    assert_eq!(grid.cell_count(), 6);
    assert_eq!(grid.origin(), &[1.0, -1.0]);
    assert_eq!(grid.spec(), spec);
}

#[test]
fn names_use_lowercase() {
    assert_eq!(serde_json::to_string(&Boundary::Left).unwrap(), r#""left""#);
    let b: Boundary = serde_json::from_str(r#""back""#).unwrap();
    assert_eq!(b, Boundary::Back);
    assert_eq!("top".parse::<Boundary>().unwrap(), Boundary::Top);
    assert!("sideways".parse::<Boundary>().is_err());

    assert_eq!(
        serde_json::to_string(&ConvectionScheme::PowerLaw).unwrap(),
        r#""power_law""#
    );
    let s: ConvectionScheme = serde_json::from_str(r#""exponential""#).unwrap();
    assert_eq!(s, ConvectionScheme::default());
}

#[test]
fn equation_round_trips_through_json() {
    let eq = Equation::builder()
        .term(DiffusionTerm::new(Coefficient::PerCell(vec![1.0, 2.0])))
        .term(DiffusionTerm::fourth_order(1.0, 0.5))
        .term(ConvectionTerm::with_scheme(vec![1.0], ConvectionScheme::Hybrid))
        .term(ImplicitSourceTerm::new(-1.0))
        .source(3.0)
        .build()
        .unwrap();
    let json = serde_json::to_string(&eq).unwrap();
    let back: Equation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, eq);
    assert_eq!(back.terms().len(), 4);
    assert_eq!(back.source_offset(), 3.0);
}
