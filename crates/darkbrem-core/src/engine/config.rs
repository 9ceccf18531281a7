use crate::core::library::MAX_RESAMPLE_ITERATIONS;
use crate::core::particle::{DarkPhoton, LeptonSpecies};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },

    #[error("Invalid dark brem scaling method '{0}'")]
    UnknownScalingMethod(String),
}

/// How a library sample is mapped onto the actual incident energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// Scale the recoil energy and keep the transverse momentum, resampling
    /// until the result is kinematically allowed.
    #[default]
    ForwardOnly,
    /// Shift the lepton + A' frame by the energy difference and boost the
    /// recoil lepton through it.
    CmScaling,
    /// Use the recorded sample as-is.
    Undefined,
}

impl ScalingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForwardOnly => "forward_only",
            Self::CmScaling => "cm_scaling",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward_only" | "forward-only" => Ok(Self::ForwardOnly),
            "cm_scaling" | "cm-scaling" => Ok(Self::CmScaling),
            "undefined" => Ok(Self::Undefined),
            other => Err(ConfigError::UnknownScalingMethod(other.to_string())),
        }
    }
}

/// Immutable configuration of a [`DarkBremModel`](super::model::DarkBremModel).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub method: ScalingMethod,
    /// Minimum lepton energy [GeV]; raised to `2 m_A'` by the estimator.
    pub threshold_gev: f64,
    pub epsilon: f64,
    pub species: LeptonSpecies,
    pub dark_photon: DarkPhoton,
    pub library_path: Option<PathBuf>,
    /// Upper bound on forward-only resampling, further capped by the
    /// smallest bucket of the loaded library.
    pub max_iterations: usize,
}

impl ModelConfig {
    /// One-line-per-field summary, as printed when a model is constructed.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dark Brem Vertex Library Model")?;
        writeln!(f, "  Lepton:          {}", self.species)?;
        writeln!(f, "  A' mass [MeV]:   {}", self.dark_photon.mass())?;
        writeln!(f, "  A' PDG id:       {}", self.dark_photon.pdg_id())?;
        writeln!(f, "  Threshold [GeV]: {}", self.threshold_gev)?;
        writeln!(f, "  Epsilon:         {}", self.epsilon)?;
        writeln!(f, "  Scaling Method:  {}", self.method)?;
        match &self.library_path {
            Some(path) => write!(f, "  Vertex Library:  {}", path.display()),
            None => write!(f, "  Vertex Library:  <none>"),
        }
    }
}

#[derive(Default)]
pub struct ModelConfigBuilder {
    method: Option<ScalingMethod>,
    threshold_gev: Option<f64>,
    epsilon: Option<f64>,
    species: Option<LeptonSpecies>,
    dark_photon: Option<DarkPhoton>,
    library_path: Option<PathBuf>,
    max_iterations: Option<usize>,
}

impl ModelConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: ScalingMethod) -> Self {
        self.method = Some(method);
        self
    }
    pub fn threshold_gev(mut self, threshold: f64) -> Self {
        self.threshold_gev = Some(threshold);
        self
    }
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }
    pub fn species(mut self, species: LeptonSpecies) -> Self {
        self.species = Some(species);
        self
    }
    pub fn dark_photon(mut self, dark_photon: DarkPhoton) -> Self {
        self.dark_photon = Some(dark_photon);
        self
    }
    pub fn library_path(mut self, path: PathBuf) -> Self {
        self.library_path = Some(path);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Builds the configuration.
    ///
    /// The dark photon is required. The scaling method defaults to
    /// forward-only, the threshold to zero, epsilon to one, the species to
    /// electrons and the iteration bound to [`MAX_RESAMPLE_ITERATIONS`].
    pub fn build(self) -> Result<ModelConfig, ConfigError> {
        let dark_photon = self
            .dark_photon
            .ok_or(ConfigError::MissingParameter("dark_photon"))?;

        let threshold_gev = self.threshold_gev.unwrap_or(0.0);
        if !(threshold_gev.is_finite() && threshold_gev >= 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "threshold_gev",
                reason: format!("must be a non-negative number, got {threshold_gev}"),
            });
        }

        let epsilon = self.epsilon.unwrap_or(1.0);
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "epsilon",
                reason: format!("must be a positive number, got {epsilon}"),
            });
        }

        let max_iterations = self.max_iterations.unwrap_or(MAX_RESAMPLE_ITERATIONS);
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(ModelConfig {
            method: self.method.unwrap_or_default(),
            threshold_gev,
            epsilon,
            species: self.species.unwrap_or_default(),
            dark_photon,
            library_path: self.library_path,
            max_iterations,
        })
    }
}

/// Options of the host-facing process wrapping a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessConfig {
    /// Deactivate after one interaction until explicitly reactivated.
    pub only_one_per_event: bool,
    /// Factor applied to the macroscopic cross section.
    pub global_bias: f64,
    /// Route cross-section queries through an [`ElementXsecCache`](super::cache::ElementXsecCache).
    pub cache_xsec: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            only_one_per_event: false,
            global_bias: 1.0,
            cache_xsec: true,
        }
    }
}
