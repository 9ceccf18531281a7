use super::cache::ElementXsecCache;
use super::config::ProcessConfig;
use super::error::EngineError;
use super::model::{DarkBremModel, InteractionProducts, TrackState};
use rand::Rng;
use tracing::{debug, info};

/// One element of the material a lepton is traversing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementDensity {
    pub atomic_mass: f64,
    pub atomic_number: f64,
    /// Atoms per mm³.
    pub number_density: f64,
}

/// Host-facing dark brem process: mean free paths and interaction products.
///
/// With `only_one_per_event` set, the process switches itself off after the
/// first interaction; the host calls [`reactivate`](Self::reactivate) at the
/// start of every event.
#[derive(Debug)]
pub struct DarkBremProcess {
    model: DarkBremModel,
    cache: ElementXsecCache,
    config: ProcessConfig,
    active: bool,
}

impl DarkBremProcess {
    pub fn new(model: DarkBremModel, config: ProcessConfig) -> Self {
        let cache = ElementXsecCache::with_estimator(model.estimator().clone());
        info!(
            only_one_per_event = config.only_one_per_event,
            global_bias = config.global_bias,
            cache_xsec = config.cache_xsec,
            "Dark brem process configured.\n{}",
            model.config()
        );
        Self {
            model,
            cache,
            config,
            active: true,
        }
    }

    pub fn model(&self) -> &DarkBremModel {
        &self.model
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// The cross sections computed so far, for publishing as a table.
    pub fn cache(&self) -> &ElementXsecCache {
        &self.cache
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reactivate(&mut self) {
        self.active = true;
    }

    /// Whether the process applies to a particle with PDG id `pdg_id`.
    pub fn is_applicable(&self, pdg_id: i32) -> bool {
        self.model.config().species.applies_to(pdg_id)
    }

    fn cross_section(&mut self, kinetic_energy: f64, element: &ElementDensity) -> Result<f64, EngineError> {
        if self.config.cache_xsec {
            Ok(self
                .cache
                .get(kinetic_energy, element.atomic_mass, element.atomic_number)?)
        } else {
            Ok(self.model.cross_section_per_atom(
                kinetic_energy,
                element.atomic_mass,
                element.atomic_number,
            ))
        }
    }

    /// Biased macroscopic cross section [1/mm] for kinetic energy
    /// `kinetic_energy` [MeV] in a material of the given elements.
    ///
    /// Zero while the process is inactive.
    pub fn inverse_mean_free_path<'e>(
        &mut self,
        kinetic_energy: f64,
        elements: impl IntoIterator<Item = &'e ElementDensity>,
    ) -> Result<f64, EngineError> {
        if !self.active {
            return Ok(0.0);
        }
        let mut sigma = 0.0;
        for element in elements {
            sigma += element.number_density * self.cross_section(kinetic_energy, element)?;
        }
        Ok(sigma * self.config.global_bias)
    }

    /// Mean free path [mm], or `f64::MAX` when no interaction is possible.
    pub fn mean_free_path<'e>(
        &mut self,
        kinetic_energy: f64,
        elements: impl IntoIterator<Item = &'e ElementDensity>,
    ) -> Result<f64, EngineError> {
        let sigma = self.inverse_mean_free_path(kinetic_energy, elements)?;
        if sigma > f64::MIN_POSITIVE {
            Ok(1.0 / sigma)
        } else {
            Ok(f64::MAX)
        }
    }

    /// Performs an interaction of `track`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotApplicable`] if the process does not apply to
    /// the track's particle type.
    pub fn post_step(
        &mut self,
        track: &TrackState,
        rng: &mut impl Rng,
    ) -> Result<InteractionProducts, EngineError> {
        if !self.is_applicable(track.pdg_id) {
            return Err(EngineError::NotApplicable {
                pdg_id: track.pdg_id,
            });
        }
        let products = self.model.generate_change(track, rng)?;
        if self.config.only_one_per_event {
            debug!("Dark brem occurred; deactivating until the next event.");
            self.active = false;
        }
        Ok(products)
    }
}
