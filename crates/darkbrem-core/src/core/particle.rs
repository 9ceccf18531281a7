use super::units::{GEV, MEV};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The charged lepton species that is allowed to dark brem.
///
/// The species fixes the incident mass used by the cross section formulas and
/// selects which approximation the estimator integrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeptonSpecies {
    #[default]
    Electron,
    Muon,
}

impl LeptonSpecies {
    /// Rest mass in MeV.
    pub fn mass(&self) -> f64 {
        match self {
            LeptonSpecies::Electron => 0.510_998_95 * MEV,
            LeptonSpecies::Muon => 105.658_375_5 * MEV,
        }
    }

    /// Rest mass in GeV, the unit of the cross section formulas.
    pub fn mass_gev(&self) -> f64 {
        self.mass() / GEV
    }

    /// PDG code of the negatively charged particle.
    pub fn pdg_id(&self) -> i32 {
        match self {
            LeptonSpecies::Electron => 11,
            LeptonSpecies::Muon => 13,
        }
    }

    /// Whether a host particle with the given PDG code is handled.
    ///
    /// Only electrons dark brem in electron mode; both muon charges are
    /// accepted in muon mode.
    pub fn applies_to(&self, pdg_id: i32) -> bool {
        match self {
            LeptonSpecies::Electron => pdg_id == 11,
            LeptonSpecies::Muon => pdg_id.abs() == 13,
        }
    }
}

impl fmt::Display for LeptonSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeptonSpecies::Electron => write!(f, "electron"),
            LeptonSpecies::Muon => write!(f, "muon"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown lepton species '{0}' (expected 'electron' or 'muon')")]
pub struct UnknownSpeciesError(pub String);

impl FromStr for LeptonSpecies {
    type Err = UnknownSpeciesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "electron" | "electrons" | "e" => Ok(LeptonSpecies::Electron),
            "muon" | "muons" | "mu" => Ok(LeptonSpecies::Muon),
            _ => Err(UnknownSpeciesError(s.to_string())),
        }
    }
}

/// PDG code given to the dark photon in the host particle table.
pub const DEFAULT_DARK_PHOTON_ID: i32 = 62;

#[derive(Debug, Error, PartialEq)]
pub enum DarkPhotonError {
    #[error("Dark photon mass must be positive and finite, got {0} MeV")]
    InvalidMass(f64),
}

/// Immutable definition of the emitted massive boson (A').
///
/// Built once when a run is configured and handed to every component that
/// needs the boson mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DarkPhoton {
    mass: f64,
    pdg_id: i32,
}

impl DarkPhoton {
    /// Creates a dark photon with the given mass in MeV.
    pub fn new(mass: f64, pdg_id: i32) -> Result<Self, DarkPhotonError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(DarkPhotonError::InvalidMass(mass));
        }
        Ok(Self { mass, pdg_id })
    }

    pub fn with_mass(mass: f64) -> Result<Self, DarkPhotonError> {
        Self::new(mass, DEFAULT_DARK_PHOTON_ID)
    }

    /// Mass in MeV.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Mass in GeV.
    pub fn mass_gev(&self) -> f64 {
        self.mass / GEV
    }

    pub fn pdg_id(&self) -> i32 {
        self.pdg_id
    }
}
