use super::form_factor::{self, FormFactorParams};
use super::particle::{DarkPhoton, LeptonSpecies};
use super::quadrature::{self, Integral};
use super::units::{GEV, GEV_TO_PB, KEV, PICOBARN};
use std::cell::Cell;

const ALPHA_EW: f64 = 1.0 / 137.0;

/// Largest A' emission angle [rad] kept in the full WW integration.
pub const THETA_MAX: f64 = 0.3;

pub const MAX_DEPTH: u32 = 20;
/// Bisection depth of each of the two nested muon integrals.
pub const FULL_WW_MAX_DEPTH: u32 = 5;
pub const TOLERANCE: f64 = 1e-9;

/// Anything able to produce a per-atom dark brem cross section.
///
/// `kinetic_energy` is in MeV and the result is in the internal area unit
/// (see [`crate::core::units`]).
pub trait CrossSection {
    fn cross_section_per_atom(&self, kinetic_energy: f64, atomic_mass: f64, atomic_number: f64)
    -> f64;
}

/// Semi-analytic Weizsäcker–Williams estimate of the dark brem cross section.
///
/// Electrons use the improved WW approximation: the flux factor χ is computed
/// once per call, including both elastic and inelastic form factors, and the
/// remaining integral over the energy fraction `x` is one dimensional.
///
/// Muons are too heavy for that simplification. Their differential cross
/// section is integrated over both `x` and the emission angle `θ ∈ [0, 0.3]`,
/// with χ evaluated at every phase-space point from the closed-form elastic
/// term alone.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSectionEstimator {
    species: LeptonSpecies,
    dark_photon: DarkPhoton,
    /// Minimum lepton energy [GeV] for a non-zero cross section.
    threshold: f64,
    epsilon: f64,
}

impl CrossSectionEstimator {
    /// `threshold` is in GeV and is raised to at least twice the A' mass.
    pub fn new(
        species: LeptonSpecies,
        dark_photon: DarkPhoton,
        threshold: f64,
        epsilon: f64,
    ) -> Self {
        Self {
            species,
            dark_photon,
            threshold: threshold.max(2.0 * dark_photon.mass_gev()),
            epsilon,
        }
    }

    pub fn species(&self) -> LeptonSpecies {
        self.species
    }

    pub fn dark_photon(&self) -> &DarkPhoton {
        &self.dark_photon
    }

    /// Effective threshold in GeV.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Cross section per atom for a lepton of kinetic energy `lepton_ke` [MeV]
    /// on an element of atomic mass `atomic_mass` and number `atomic_number`.
    pub fn compute(&self, lepton_ke: f64, atomic_mass: f64, atomic_number: f64) -> f64 {
        let Some(integral) = self.integrate_phase_space(lepton_ke, atomic_mass, atomic_number)
        else {
            return 0.0;
        };

        let cross = integral.value * GEV_TO_PB * PICOBARN;
        // NaN and round-off negatives both collapse to zero
        if cross > 0.0 { cross } else { 0.0 }
    }

    /// Natural-unit integral behind [`Self::compute`], or `None` below threshold.
    fn integrate_phase_space(
        &self,
        lepton_ke: f64,
        atomic_mass: f64,
        atomic_number: f64,
    ) -> Option<Integral> {
        if !(lepton_ke >= KEV && lepton_ke >= self.threshold * GEV) {
            return None;
        }

        let lepton_mass = self.species.mass_gev();
        let lepton_e = lepton_ke / GEV + lepton_mass;
        let kin = Kinematics {
            lepton_e,
            lepton_e_sq: lepton_e * lepton_e,
            lepton_mass_sq: lepton_mass * lepton_mass,
            ma2: self.dark_photon.mass_gev().powi(2),
            coupling: self.epsilon * self.epsilon * ALPHA_EW.powi(3),
        };
        let params = FormFactorParams::new(atomic_mass, atomic_number);

        let x_max = 1.0 - lepton_mass.max(self.dark_photon.mass_gev()) / lepton_e;

        Some(match self.species {
            LeptonSpecies::Electron => self.improved_ww(&kin, &params, x_max),
            LeptonSpecies::Muon => self.full_ww(&kin, &params, x_max),
        })
    }

    fn improved_ww(&self, kin: &Kinematics, params: &FormFactorParams, x_max: f64) -> Integral {
        // χ is evaluated once at θ = 0, x = 1
        let t_min = kin.ma2 * kin.ma2 / (4.0 * kin.lepton_e_sq);
        let t_max = kin.ma2 + kin.lepton_mass_sq;
        let chi = form_factor::chi_numerical(params, t_min, t_max);
        let beta = (1.0 - kin.ma2 / kin.lepton_e_sq).sqrt();

        let dsigma_dx = |x: f64| {
            if x * kin.lepton_e < self.threshold {
                return 0.0;
            }
            let numerator = 1.0 - x + x * x / 3.0;
            let denominator = kin.ma2 * (1.0 - x) / x + kin.lepton_mass_sq * x;
            4.0 * kin.coupling * chi * beta * numerator / denominator
        };

        quadrature::integrate(dsigma_dx, 0.0, x_max, MAX_DEPTH, TOLERANCE)
    }

    fn full_ww(&self, kin: &Kinematics, params: &FormFactorParams, x_max: f64) -> Integral {
        let inner_evaluations = Cell::new(0);
        let dsigma_dx = |x: f64| {
            let inner = quadrature::integrate(
                |theta| self.differential(kin, params, x, theta),
                0.0,
                THETA_MAX,
                FULL_WW_MAX_DEPTH,
                TOLERANCE,
            );
            inner_evaluations.set(inner_evaluations.get() + inner.evaluations);
            inner.value
        };

        let outer = quadrature::integrate(dsigma_dx, 0.0, x_max, FULL_WW_MAX_DEPTH, TOLERANCE);
        Integral {
            evaluations: outer.evaluations + inner_evaluations.get(),
            ..outer
        }
    }

    /// `dσ/(dx dθ)` of the full WW approximation, Eqs. (16) and (17) of
    /// arXiv:2101.12192 with the elastic-only analytic χ.
    fn differential(&self, kin: &Kinematics, params: &FormFactorParams, x: f64, theta: f64) -> f64 {
        if x * kin.lepton_e < self.threshold {
            return 0.0;
        }

        let x_sq = x * x;
        let one_minus_x = 1.0 - x;
        let utilde = -x * kin.lepton_e_sq * theta * theta
            - kin.ma2 * one_minus_x / x
            - kin.lepton_mass_sq * x;
        let utilde_sq = utilde * utilde;

        let t_min = utilde_sq / (4.0 * kin.lepton_e_sq * one_minus_x * one_minus_x);
        let t_max = kin.lepton_e_sq;
        if !(t_min >= 0.0 && t_max >= t_min) {
            return 0.0;
        }

        let chi = form_factor::chi_elastic_analytic(params, t_min, t_max);

        let factor1 = 2.0 * (2.0 - 2.0 * x + x_sq) / one_minus_x;
        let factor2 = 4.0 * (kin.ma2 + 2.0 * kin.lepton_mass_sq) / utilde_sq;
        let factor3 = utilde * x + kin.ma2 * one_minus_x + kin.lepton_mass_sq * x_sq;
        let amplitude_sq = factor1 + factor2 * factor3;

        2.0 * kin.coupling
            * (x_sq * kin.lepton_e_sq - kin.ma2).sqrt()
            * kin.lepton_e
            * one_minus_x
            * (chi / utilde_sq)
            * amplitude_sq
            * theta.sin()
    }
}

impl CrossSection for CrossSectionEstimator {
    fn cross_section_per_atom(
        &self,
        kinetic_energy: f64,
        atomic_mass: f64,
        atomic_number: f64,
    ) -> f64 {
        self.compute(kinetic_energy, atomic_mass, atomic_number)
    }
}

/// Per-call constants shared by the integrands, all in GeV.
struct Kinematics {
    lepton_e: f64,
    lepton_e_sq: f64,
    lepton_mass_sq: f64,
    ma2: f64,
    coupling: f64,
}
