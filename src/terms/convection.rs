//! Convection `∇·(uφ)` with a selectable face interpolation scheme.
//!
//! The face value is split as `w φ_owner + (1 − w) φ_neighbor`, where the
//! owner weight `w` depends on the face Péclet number `Pe = a d / D_f`, with
//! `a = u·n` and `D_f` the summed second-order diffusivity of the equation.

use super::coefficient::VectorCoefficient;
use super::{AssemblyContext, map_faces};
use crate::algs::system::{BoundaryCoefficients, LinearSystem};
use crate::fvm_error::FvmError;
use serde::{Deserialize, Serialize};

/// Below this |Pe| the exponential weight uses its Taylor expansion.
const SMALL_PECLET: f64 = 1e-6;

/// Face interpolation scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvectionScheme {
    /// Scharfetter–Gummel weighting, exact for 1D steady convection-diffusion.
    #[default]
    Exponential,
    Upwind,
    Central,
    Hybrid,
    PowerLaw,
}

/// Face Péclet number; `±∞` when the face carries no diffusion.
#[inline]
pub fn peclet(normal_velocity: f64, distance: f64, diffusivity: f64) -> f64 {
    if normal_velocity == 0.0 {
        0.0
    } else if diffusivity == 0.0 {
        normal_velocity.signum() * f64::INFINITY
    } else {
        normal_velocity * distance / diffusivity
    }
}

/// `x / (eˣ − 1)`, the Bernoulli function.
#[inline]
fn bernoulli(x: f64) -> f64 {
    x / x.exp_m1()
}

/// Weight of the owner cell's value in the face value.
///
/// Infinite Péclet numbers reduce every scheme except `Central` to upwinding:
/// `0` for `Pe > 0`, `1` for `Pe < 0`.
pub fn owner_weight(scheme: ConvectionScheme, pe: f64) -> f64 {
    if pe.is_nan() {
        return 0.5;
    }
    if scheme == ConvectionScheme::Central {
        return 0.5;
    }
    if pe.is_infinite() {
        return if pe > 0.0 { 0.0 } else { 1.0 };
    }
    match scheme {
        ConvectionScheme::Exponential => {
            if pe.abs() < SMALL_PECLET {
                0.5 - pe / 12.0
            } else {
                // exp_m1 overflows past Pe ≈ 709, where B(Pe) = 0 is exact enough.
                (1.0 - bernoulli(pe)) / pe
            }
        }
        ConvectionScheme::Upwind => {
            if pe > 0.0 {
                0.0
            } else if pe < 0.0 {
                1.0
            } else {
                0.5
            }
        }
        ConvectionScheme::Hybrid => {
            if pe > 2.0 {
                1.0 / pe
            } else if pe < -2.0 {
                (pe + 1.0) / pe
            } else {
                0.5
            }
        }
        ConvectionScheme::PowerLaw => {
            if pe > 10.0 {
                1.0 / pe
            } else if pe > 0.0 {
                (1.0 - (1.0 - pe / 10.0).powi(5)) / pe
            } else if pe == 0.0 {
                0.5
            } else if pe >= -10.0 {
                (pe + 1.0 - (1.0 + pe / 10.0).powi(5)) / pe
            } else {
                (pe + 1.0) / pe
            }
        }
        ConvectionScheme::Central => 0.5,
    }
}

/// `∇·(uφ)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvectionTerm {
    velocity: VectorCoefficient,
    #[serde(default)]
    scheme: ConvectionScheme,
}

impl ConvectionTerm {
    /// Exponential-scheme convection.
    pub fn new(velocity: impl Into<VectorCoefficient>) -> Self {
        Self::with_scheme(velocity, ConvectionScheme::default())
    }

    pub fn with_scheme(velocity: impl Into<VectorCoefficient>, scheme: ConvectionScheme) -> Self {
        Self {
            velocity: velocity.into(),
            scheme,
        }
    }

    #[inline]
    pub fn scheme(&self) -> ConvectionScheme {
        self.scheme
    }

    #[inline]
    pub fn velocity(&self) -> &VectorCoefficient {
        &self.velocity
    }

    pub(crate) fn assemble(
        &self,
        ctx: &AssemblyContext<'_>,
        system: &mut LinearSystem,
    ) -> Result<(), FvmError> {
        let fluxes = self.velocity.normal_fluxes(ctx)?;
        let stencils = map_faces(ctx.faces().len(), |face| {
            let g = &ctx.faces()[face];
            let a = fluxes[face];
            let pe = peclet(a, g.distance, ctx.diffusivity_at(face));
            Ok((a * g.area, owner_weight(self.scheme, pe)))
        })?;

        for (g, (flux, w)) in ctx.faces().iter().zip(stencils) {
            if flux == 0.0 {
                continue;
            }
            let o = g.owner;
            match g.neighbor {
                Some(n) => {
                    system.add(o, o, -flux * w);
                    system.add(o, n, -flux * (1.0 - w));
                    system.add(n, n, flux * (1.0 - w));
                    system.add(n, o, flux * w);
                }
                None => system.record_boundary(
                    g.face,
                    o,
                    BoundaryCoefficients {
                        value_diagonal: -flux * w,
                        value_rhs: flux * (1.0 - w),
                        flux_rhs: 0.0,
                    },
                ),
            }
        }
        Ok(())
    }
}
