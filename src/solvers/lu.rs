//! Dense LU with partial pivoting, backed by `faer`.

use super::{LinearSolver, Solution, SolverConfig, check_dimensions, residual_scale, spmv};
use crate::fvm_error::FvmError;
use faer::prelude::Solve;
use faer::{Col, Mat};
use sprs::CsMat;

/// Largest normwise backward error accepted from the factorization.
const BACKWARD_ERROR_LIMIT: f64 = 1e-6;

/// Normwise backward error `‖r‖ / (‖A‖_F ‖x‖ + ‖b‖)` of a residual `r = b − Ax`.
pub(crate) fn backward_error(residual: &[f64], matrix_norm: f64, x: &[f64], rhs: &[f64]) -> f64 {
    let norm = |v: &[f64]| v.iter().map(|a| a * a).sum::<f64>().sqrt();
    let denom = matrix_norm * norm(x) + norm(rhs);
    if denom == 0.0 { 0.0 } else { norm(residual) / denom }
}

/// Direct solver; refines the LU solution until the relative residual drops
/// below the tolerance, stops improving, or `max_iterations` sweeps have run.
///
/// Empty rows, non-finite results and a backward error above `1e-6` (or the
/// tolerance, when looser) are reported as failures.
#[derive(Clone, Debug, Default)]
pub struct LinearLUSolver {
    config: SolverConfig,
}

impl LinearLUSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    fn failure(&self, iterations: usize, residual: Option<f64>, reason: impl Into<String>) -> FvmError {
        FvmError::SolveFailure {
            solver: self.name(),
            iterations,
            residual,
            reason: reason.into(),
        }
    }
}

impl LinearSolver for LinearLUSolver {
    fn name(&self) -> &'static str {
        "lu"
    }

    fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn solve(&self, matrix: &CsMat<f64>, rhs: &[f64], guess: &[f64]) -> Result<Solution, FvmError> {
        check_dimensions(matrix, rhs, guess)?;
        let n = rhs.len();
        if n == 0 {
            return Ok(Solution {
                values: Vec::new(),
                iterations: 0,
                residual: 0.0,
            });
        }

        let mut dense = Mat::<f64>::zeros(n, n);
        let mut row_has_entry = vec![false; n];
        let mut frobenius = 0.0;
        for (&a, (row, col)) in matrix.iter() {
            dense[(row, col)] += a;
            row_has_entry[row] |= a != 0.0;
            frobenius += a * a;
        }
        let frobenius = frobenius.sqrt();
        if let Some(row) = row_has_entry.iter().position(|has| !has) {
            return Err(self.failure(0, None, format!("matrix is singular: row {row} is empty")));
        }

        let lu = dense.as_ref().partial_piv_lu();
        let b = Col::<f64>::from_fn(n, |i| rhs[i]);
        let first = lu.solve(&b);
        let mut x: Vec<f64> = (0..n).map(|i| first[i]).collect();

        let scale = residual_scale(rhs);
        let mut ax = vec![0.0; n];
        let mut r = vec![0.0; n];
        let mut sweeps = 0;
        let mut previous = f64::INFINITY;
        let residual = loop {
            if x.iter().any(|v| !v.is_finite()) {
                return Err(self.failure(sweeps, None, "factorization produced non-finite values"));
            }
            spmv(matrix, &x, &mut ax);
            for i in 0..n {
                r[i] = rhs[i] - ax[i];
            }
            let residual = r.iter().map(|v| v * v).sum::<f64>().sqrt() / scale;
            if !residual.is_finite() {
                return Err(self.failure(sweeps, None, "residual is not finite"));
            }
            // Refinement has stalled once the residual stops shrinking.
            if residual <= self.config.tolerance
                || sweeps >= self.config.max_iterations
                || residual >= 0.5 * previous
            {
                break residual;
            }
            previous = residual;
            let correction = lu.solve(&Col::<f64>::from_fn(n, |i| r[i]));
            for (i, xi) in x.iter_mut().enumerate() {
                *xi += correction[i];
            }
            sweeps += 1;
        };

        let eta = backward_error(&r, frobenius, &x, rhs);
        if eta > self.config.tolerance.max(BACKWARD_ERROR_LIMIT) {
            return Err(self.failure(
                sweeps,
                Some(residual),
                format!("factorization is inaccurate: backward error {eta:.3e}"),
            ));
        }

        log::debug!("lu solve: n={n}, refinement sweeps={sweeps}, residual={residual:.3e}");
        Ok(Solution {
            values: x,
            iterations: sweeps,
            residual,
        })
    }
}
