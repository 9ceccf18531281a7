use super::config::ModelConfig;
use super::error::EngineError;
use super::scaling::{ScaledRecoil, ScalingEngine};
use crate::core::kinematics::rotate_uz;
use crate::core::library::{CsvLibrary, EventLibrary};
use crate::core::units::GEV;
use crate::core::xsec::{CrossSection, CrossSectionEstimator};
use nalgebra::Vector3;
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// State of the incident lepton at the point of interaction, in MeV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackState {
    pub momentum: Vector3<f64>,
    pub total_energy: f64,
    pub mass: f64,
    pub pdg_id: i32,
}

/// Outgoing momenta [MeV] of a dark brem interaction in the lab frame.
///
/// The A' momentum is the incident momentum minus the recoil momentum;
/// nuclear recoil is neglected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionProducts {
    pub recoil: Vector3<f64>,
    pub recoil_energy: f64,
    pub boson: Vector3<f64>,
}

/// Dark brem model backed by a vertex library.
///
/// Owns the cross-section estimator, the scaling engine and the event
/// library. Each execution context is expected to own its own model; nothing
/// inside is shared mutably.
#[derive(Debug, Clone)]
pub struct DarkBremModel {
    config: ModelConfig,
    estimator: Arc<CrossSectionEstimator>,
    scaling: ScalingEngine,
    library: EventLibrary,
}

impl DarkBremModel {
    /// Builds a model, loading the CSV event library at `config.library_path`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingLibrary`] if no path is configured and
    /// propagates any [`LibraryError`](crate::core::library::LibraryError).
    pub fn new(config: ModelConfig, rng: &mut impl Rng) -> Result<Self, EngineError> {
        let path = config
            .library_path
            .clone()
            .ok_or(EngineError::MissingLibrary)?;
        let library = EventLibrary::load(&CsvLibrary, &path, rng)?;
        Self::with_library(config, library)
    }

    /// Builds a model around an already constructed library.
    ///
    /// # Errors
    ///
    /// Returns a [`LibraryError::MassMismatch`](crate::core::library::LibraryError::MassMismatch)
    /// if the library was generated for a different A' mass.
    pub fn with_library(config: ModelConfig, library: EventLibrary) -> Result<Self, EngineError> {
        library.validate_dark_photon_mass(config.dark_photon.mass_gev())?;

        for (energy, count) in library.summary() {
            debug!(energy_gev = energy, samples = count, "Event library bucket.");
        }

        let estimator = Arc::new(CrossSectionEstimator::new(
            config.species,
            config.dark_photon,
            config.threshold_gev,
            config.epsilon,
        ));
        let scaling = ScalingEngine::new(config.method, &config.dark_photon, config.max_iterations);
        info!(
            method = %config.method,
            species = %config.species,
            threshold_gev = estimator.threshold(),
            epsilon = config.epsilon,
            library_samples = library.len(),
            "Dark brem model ready."
        );

        Ok(Self {
            config,
            estimator,
            scaling,
            library,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The estimator, shareable with caches in other contexts.
    pub fn estimator(&self) -> &Arc<CrossSectionEstimator> {
        &self.estimator
    }

    pub fn library(&self) -> &EventLibrary {
        &self.library
    }

    /// Cross section per atom [internal area unit] for a lepton of kinetic
    /// energy `kinetic_energy` [MeV].
    pub fn cross_section_per_atom(&self, kinetic_energy: f64, atomic_mass: f64, atomic_number: f64) -> f64 {
        self.estimator
            .cross_section_per_atom(kinetic_energy, atomic_mass, atomic_number)
    }

    /// Scales one library sample to `incident_energy` [GeV] without rotating
    /// it out of the +z frame.
    pub fn scample(&mut self, incident_energy: f64, lepton_mass: f64, rng: &mut impl Rng) -> ScaledRecoil {
        self.scaling
            .scale(&mut self.library, incident_energy, lepton_mass, rng)
    }

    /// Produces the recoil lepton and A' for an interaction of `track`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTrack`] if the track has no direction or
    /// non-finite kinematics.
    pub fn generate_change(
        &mut self,
        track: &TrackState,
        rng: &mut impl Rng,
    ) -> Result<InteractionProducts, EngineError> {
        if !(track.total_energy.is_finite() && track.momentum.iter().all(|c| c.is_finite())) {
            return Err(EngineError::InvalidTrack("non-finite kinematics".to_string()));
        }
        if track.momentum.norm() == 0.0 {
            return Err(EngineError::InvalidTrack("zero momentum".to_string()));
        }

        let scaled = self.scample(track.total_energy / GEV, track.mass / GEV, rng);
        let recoil = rotate_uz(&scaled.momentum, &track.momentum);
        Ok(InteractionProducts {
            recoil,
            recoil_energy: scaled.energy,
            boson: track.momentum - recoil,
        })
    }
}

impl fmt::Display for DarkBremModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::kinematics::FourMomentum;
    use crate::core::library::{LibraryError, OutgoingKinematics, write_library_csv};
    use crate::core::particle::{DarkPhoton, LeptonSpecies};
    use crate::core::units::MEV;
    use crate::engine::config::{ModelConfigBuilder, ScalingMethod};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub(crate) const AP_MASS_GEV: f64 = 0.1;

    /// Consistent electron + A' samples at a handful of beam energies.
    pub(crate) fn electron_samples() -> Vec<OutgoingKinematics> {
        let m = LeptonSpecies::Electron.mass_gev();
        let mut samples = Vec::new();
        for incident in [2.0, 4.0, 8.0] {
            for (fraction, pt) in [(0.1, 0.01), (0.3, 0.03), (0.6, 0.02), (0.8, 0.005)] {
                let e = fraction * incident;
                let lepton = FourMomentum::new(e, pt, 0.0, (e * e - m * m - pt * pt).sqrt());
                let ap_e = incident - e;
                let ap_pz = (ap_e * ap_e - AP_MASS_GEV * AP_MASS_GEV - pt * pt).sqrt();
                let ap = FourMomentum::new(ap_e, -pt, 0.0, ap_pz);
                samples.push(OutgoingKinematics::from_products(lepton, ap, incident));
            }
        }
        samples
    }

    pub(crate) fn electron_config(method: ScalingMethod) -> ModelConfig {
        ModelConfigBuilder::new()
            .dark_photon(DarkPhoton::with_mass(AP_MASS_GEV * GEV).unwrap())
            .method(method)
            .build()
            .unwrap()
    }

    pub(crate) fn electron_model(rng: &mut StdRng) -> DarkBremModel {
        let library = EventLibrary::new(electron_samples(), rng).unwrap();
        DarkBremModel::with_library(electron_config(ScalingMethod::ForwardOnly), library).unwrap()
    }

    #[test]
    fn model_without_library_path_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = DarkBremModel::new(electron_config(ScalingMethod::ForwardOnly), &mut rng);
        assert!(matches!(result, Err(EngineError::MissingLibrary)));
    }

    #[test]
    fn model_loads_library_from_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electrons.csv");
        let mut buffer = Vec::new();
        write_library_csv(&electron_samples(), &mut buffer).unwrap();
        std::fs::write(&path, buffer).unwrap();

        let mut config = electron_config(ScalingMethod::CmScaling);
        config.library_path = Some(path);
        let mut rng = StdRng::seed_from_u64(2);
        let model = DarkBremModel::new(config, &mut rng).unwrap();
        assert_eq!(model.library().len(), 12);
        assert_eq!(model.library().num_energies(), 3);
    }

    #[test]
    fn library_for_another_mass_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let library = EventLibrary::new(electron_samples(), &mut rng).unwrap();
        let mut config = electron_config(ScalingMethod::ForwardOnly);
        config.dark_photon = DarkPhoton::with_mass(500.0 * MEV).unwrap();

        let result = DarkBremModel::with_library(config, library);
        assert!(matches!(
            result,
            Err(EngineError::Library {
                source: LibraryError::MassMismatch { .. }
            })
        ));
    }

    #[test]
    fn cross_section_matches_estimator() {
        let mut rng = StdRng::seed_from_u64(4);
        let model = electron_model(&mut rng);
        let direct = model.estimator().compute(4.0 * GEV, 183.84, 74.0);
        assert_eq!(model.cross_section_per_atom(4.0 * GEV, 183.84, 74.0), direct);
        assert!(direct > 0.0);
    }

    #[test]
    fn generated_change_conserves_three_momentum() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut model = electron_model(&mut rng);
        let m = LeptonSpecies::Electron.mass();
        let momentum = Vector3::new(300.0, -200.0, 3500.0);
        let track = TrackState {
            momentum,
            total_energy: (momentum.norm_squared() + m * m).sqrt(),
            mass: m,
            pdg_id: 11,
        };

        for _ in 0..20 {
            let products = model.generate_change(&track, &mut rng).unwrap();
            let total = products.recoil + products.boson;
            assert!((total - momentum).norm() < 1e-9 * momentum.norm());
            let on_shell = (products.recoil_energy.powi(2) - m * m).sqrt();
            assert!((products.recoil.norm() - on_shell).abs() < 1e-9 * on_shell);
            assert!(products.recoil.dot(&momentum) > 0.0);
        }
    }

    #[test]
    fn generated_change_rejects_track_at_rest() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut model = electron_model(&mut rng);
        let track = TrackState {
            momentum: Vector3::zeros(),
            total_energy: 0.511,
            mass: 0.511,
            pdg_id: 11,
        };
        assert!(matches!(
            model.generate_change(&track, &mut rng),
            Err(EngineError::InvalidTrack(_))
        ));
    }

    #[test]
    fn display_describes_configuration() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = electron_model(&mut rng);
        let text = model.to_string();
        assert!(text.contains("forward_only"));
        assert!(text.contains("Epsilon"));
    }
}
