use crate::cli::{ModelArgs, ScampleArgs, XsecArgs};
use crate::error::{CliError, Result};
use darkbrem::core::elements;
use darkbrem::core::particle::{DarkPhoton, LeptonSpecies};
use darkbrem::engine::config as core_config;
use darkbrem::workflows::xsec_table::XsecTableRequest;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const ELECTRON_AP_MASS_MEV: f64 = 100.0;
const MUON_AP_MASS_MEV: f64 = 1000.0;
const ELECTRON_INCIDENT_ENERGY_GEV: f64 = 4.0;
const MUON_INCIDENT_ENERGY_GEV: f64 = 100.0;
const DEFAULT_NUM_EVENTS: usize = 100;
const DEFAULT_TARGET: &str = "W";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialModelConfig {
    ap_mass: Option<f64>,
    muons: Option<bool>,
    epsilon: Option<f64>,
    threshold: Option<f64>,
    method: Option<String>,
    db_lib: Option<PathBuf>,
    max_iterations: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialXsecConfig {
    energy: Option<Vec<f64>>,
    target: Option<String>,
    atomic_number: Option<f64>,
    atomic_mass: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialScampleConfig {
    incident_energy: Option<f64>,
    num_events: Option<usize>,
    seed: Option<u64>,
}

/// Settings for one `scample` run after merging file and command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScampleSettings {
    pub model: core_config::ModelConfig,
    pub incident_energy: f64,
    pub num_events: usize,
    pub seed: Option<u64>,
}

/// Contents of a TOML configuration file. Every value is optional and
/// overridden by the matching command-line flag.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    model: Option<PartialModelConfig>,
    xsec: Option<PartialXsecConfig>,
    scample: Option<PartialScampleConfig>,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `path` if given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    pub fn merge_xsec(mut self, args: &XsecArgs) -> Result<(core_config::ModelConfig, XsecTableRequest)> {
        let model_file = self.model.take().unwrap_or_default();
        let xsec_file = self.xsec.take().unwrap_or_default();

        let model = Self::model_builder(&args.model, &model_file)?
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let mut request = XsecTableRequest::default();
        if let Some(values) = args.energy.as_ref().or(xsec_file.energy.as_ref()) {
            (request.min_energy, request.max_energy, request.step) = parse_arange(values)?;
        }

        let (atomic_number, atomic_mass) = match &args.target {
            Some(values) => parse_target(values)?,
            None => match (xsec_file.atomic_number, xsec_file.atomic_mass) {
                (Some(z), Some(a)) => (z, a),
                (None, None) => {
                    let symbol = xsec_file.target.as_deref().unwrap_or(DEFAULT_TARGET);
                    parse_target(&[symbol.to_string()])?
                }
                _ => {
                    return Err(CliError::Config(
                        "`xsec.atomic-number` and `xsec.atomic-mass` must be given together."
                            .to_string(),
                    ));
                }
            },
        };
        request.atomic_number = atomic_number;
        request.atomic_mass = atomic_mass;

        Ok((model, request))
    }

    pub fn merge_scample(mut self, args: &ScampleArgs) -> Result<ScampleSettings> {
        let model_file = self.model.take().unwrap_or_default();
        let scample_file = self.scample.take().unwrap_or_default();

        let library = args
            .library
            .clone()
            .or_else(|| model_file.db_lib.clone())
            .ok_or_else(|| {
                CliError::Config(
                    "An event library is required either via --db-lib or `model.db-lib`."
                        .to_string(),
                )
            })?;

        let method = match (&args.method, &model_file.method) {
            (Some(method), _) => *method,
            (None, Some(name)) => name
                .parse()
                .map_err(|e: core_config::ConfigError| CliError::Config(e.to_string()))?,
            (None, None) => core_config::ScalingMethod::default(),
        };

        let mut builder = Self::model_builder(&args.model, &model_file)?
            .method(method)
            .library_path(library);
        if let Some(iterations) = args.max_iterations.or(model_file.max_iterations) {
            builder = builder.max_iterations(iterations);
        }
        let model = builder.build().map_err(|e| CliError::Config(e.to_string()))?;

        let incident_energy = args
            .incident_energy
            .or(scample_file.incident_energy)
            .unwrap_or(match model.species {
                LeptonSpecies::Electron => ELECTRON_INCIDENT_ENERGY_GEV,
                LeptonSpecies::Muon => MUON_INCIDENT_ENERGY_GEV,
            });
        if !(incident_energy.is_finite() && incident_energy > 0.0) {
            return Err(CliError::Argument(format!(
                "incident energy must be a positive number of GeV, got {incident_energy}"
            )));
        }

        Ok(ScampleSettings {
            model,
            incident_energy,
            num_events: args
                .num_events
                .or(scample_file.num_events)
                .unwrap_or(DEFAULT_NUM_EVENTS),
            seed: args.seed.or(scample_file.seed),
        })
    }

    fn model_builder(
        args: &ModelArgs,
        file: &PartialModelConfig,
    ) -> Result<core_config::ModelConfigBuilder> {
        let species = if args.muons || file.muons.unwrap_or(false) {
            LeptonSpecies::Muon
        } else {
            LeptonSpecies::Electron
        };
        let ap_mass = args.ap_mass.or(file.ap_mass).unwrap_or(match species {
            LeptonSpecies::Electron => ELECTRON_AP_MASS_MEV,
            LeptonSpecies::Muon => MUON_AP_MASS_MEV,
        });
        let dark_photon =
            DarkPhoton::with_mass(ap_mass).map_err(|e| CliError::Config(e.to_string()))?;

        let mut builder = core_config::ModelConfigBuilder::new()
            .species(species)
            .dark_photon(dark_photon);
        if let Some(epsilon) = args.epsilon.or(file.epsilon) {
            builder = builder.epsilon(epsilon);
        }
        if let Some(threshold) = args.threshold.or(file.threshold) {
            builder = builder.threshold_gev(threshold);
        }
        Ok(builder)
    }
}

/// Interprets one to three values the way Python's `arange` does:
/// `STOP`, `START STOP` or `START STOP STEP`.
fn parse_arange(values: &[f64]) -> Result<(f64, f64, f64)> {
    let defaults = XsecTableRequest::default();
    match *values {
        [stop] => Ok((defaults.min_energy, stop, defaults.step)),
        [start, stop] => Ok((start, stop, defaults.step)),
        [start, stop, step] => Ok((start, stop, step)),
        _ => Err(CliError::Argument(format!(
            "an energy range takes one to three values, got {}",
            values.len()
        ))),
    }
}

/// Resolves a target given as an element symbol or as `Z A`.
fn parse_target(values: &[String]) -> Result<(f64, f64)> {
    match values {
        [symbol] => elements::lookup(symbol)
            .map(|element| (element.atomic_number, element.atomic_mass))
            .ok_or_else(|| {
                CliError::Argument(format!(
                    "unknown element '{}'; known symbols are {}",
                    symbol,
                    elements::symbols().collect::<Vec<_>>().join(", ")
                ))
            }),
        [z, a] => {
            let parse = |value: &str| {
                value
                    .parse::<f64>()
                    .map_err(|_| CliError::Argument(format!("invalid target value '{value}'")))
            };
            Ok((parse(z)?, parse(a)?))
        }
        _ => Err(CliError::Argument(
            "a target is an element symbol or 'Z A'".to_string(),
        )),
    }
}
