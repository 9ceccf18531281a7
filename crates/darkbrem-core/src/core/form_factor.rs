//! Effective photon flux factors built from nuclear form factors.
//!
//! The elastic and inelastic form factors follow Appendix A (Eqs. A18, A19) of
//! Bjorken et al., Phys. Rev. D 80, 075018. All momentum transfers are in GeV².

use super::quadrature;

/// Electron mass in GeV as it appears in the atomic screening radii.
const SCREENING_ELECTRON_MASS: f64 = 0.000_511;
const PROTON_MASS: f64 = 0.938;
const PROTON_MU: f64 = 2.79;
const INELASTIC_DIPOLE: f64 = 0.71;

pub const CHI_MAX_DEPTH: u32 = 20;
pub const CHI_TOLERANCE: f64 = 1e-9;

/// Screening and nuclear-size parameters of one target element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormFactorParams {
    z: f64,
    /// `1/a²` of the elastic atomic screening term.
    elastic_screening: f64,
    /// `d` of the elastic nuclear-size term.
    elastic_size: f64,
    /// `1/a_p²` of the inelastic atomic screening term.
    inelastic_screening: f64,
}

impl FormFactorParams {
    pub fn new(atomic_mass: f64, atomic_number: f64) -> Self {
        let a_el = 111.0 * atomic_number.powf(-1.0 / 3.0) / SCREENING_ELECTRON_MASS;
        let a_in = 773.0 * atomic_number.powf(-2.0 / 3.0) / SCREENING_ELECTRON_MASS;
        Self {
            z: atomic_number,
            elastic_screening: 1.0 / (a_el * a_el),
            elastic_size: 0.164 * atomic_mass.powf(-2.0 / 3.0),
            inelastic_screening: 1.0 / (a_in * a_in),
        }
    }

    /// Elastic contribution to the flux integrand, already divided by `t²`.
    fn elastic(&self, t: f64) -> f64 {
        let screening = 1.0 / (self.elastic_screening + t);
        let size = 1.0 / (1.0 + t / self.elastic_size);
        let g = self.z * screening * size;
        g * g
    }

    /// Inelastic contribution to the flux integrand, already divided by `t²`.
    fn inelastic(&self, t: f64) -> f64 {
        let magnetic = (PROTON_MU * PROTON_MU - 1.0) / (4.0 * PROTON_MASS * PROTON_MASS);
        let screening = 1.0 / (self.inelastic_screening + t);
        let dipole = 1.0 / (1.0 + t / INELASTIC_DIPOLE);
        let g = screening * (1.0 + t * magnetic) * dipole.powi(4);
        self.z * g * g
    }
}

/// Flux factor χ including both elastic and inelastic form factors,
/// integrated numerically over `t ∈ [t_min, t_max]`.
///
/// The `1/t²` of the measure is cancelled analytically inside the form
/// factors so the integrand stays finite at small `t`.
pub fn chi_numerical(params: &FormFactorParams, t_min: f64, t_max: f64) -> f64 {
    quadrature::integrate(
        |t| (params.elastic(t) + params.inelastic(t)) * (t - t_min),
        t_min,
        t_max,
        CHI_MAX_DEPTH,
        CHI_TOLERANCE,
    )
    .value
}

/// Closed-form χ for the elastic form factor only.
pub fn chi_elastic_analytic(params: &FormFactorParams, t_min: f64, t_max: f64) -> f64 {
    let ta = params.elastic_screening;
    let td = params.elastic_size;
    let z2 = params.z * params.z;

    let rational = (ta - td) * (ta + td + 2.0 * t_max) * (t_max - t_min)
        / ((ta + t_max) * (td + t_max));
    let logarithmic = (ta + td + 2.0 * t_min)
        * ((ta + t_max).ln() - (td + t_max).ln() - (ta + t_min).ln() + (td + t_min).ln());

    -z2 * td * td * (rational + logarithmic) / (ta - td).powi(3)
}
