//! Unit system shared with the host transport engine.
//!
//! Quantities crossing the host boundary are expressed in the CLHEP convention
//! where `MeV` and `mm` are unity. The dark brem formulas and the event library
//! work in GeV; conversions are done at the edges with the constants below.

pub const MEV: f64 = 1.0;
pub const GEV: f64 = 1.0e3 * MEV;
pub const KEV: f64 = 1.0e-3 * MEV;

pub const MM: f64 = 1.0;
pub const CM: f64 = 10.0 * MM;

pub const BARN: f64 = 1.0e-22 * MM * MM;
pub const PICOBARN: f64 = 1.0e-12 * BARN;

/// Conversion of a natural-unit cross section (GeV⁻²) into picobarns.
pub const GEV_TO_PB: f64 = 3.894e8;

/// Avogadro's number in mol⁻¹.
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Number of atoms per mm³ of an element with the given density [g/cm³]
/// and molar mass [g/mol].
pub fn number_density(density_g_cm3: f64, molar_mass: f64) -> f64 {
    density_g_cm3 * AVOGADRO / molar_mass / (CM * CM * CM)
}
