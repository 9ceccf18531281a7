use crate::core::units::GEV;
use crate::core::xsec::CrossSectionEstimator;
use crate::engine::cache::{CacheError, ElementXsecCache};
use crate::engine::config::{ConfigError, ModelConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, instrument};

/// Energies handed to one worker cache at a time.
const CHUNK_SIZE: usize = 16;

/// Energy scan for one target element. Energies are kinetic and in GeV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XsecTableRequest {
    pub min_energy: f64,
    pub max_energy: f64,
    pub step: f64,
    pub atomic_mass: f64,
    pub atomic_number: f64,
}

impl Default for XsecTableRequest {
    fn default() -> Self {
        Self {
            min_energy: 0.0,
            max_energy: 4.0,
            step: 0.1,
            atomic_mass: 183.84,
            atomic_number: 74.0,
        }
    }
}

impl XsecTableRequest {
    /// Kinetic energies [MeV] from `min_energy` up to and including
    /// `max_energy`, `step` apart.
    pub fn energies(&self) -> Result<Vec<f64>, ConfigError> {
        let invalid = |parameter, reason: &str| ConfigError::InvalidValue {
            parameter,
            reason: reason.to_string(),
        };
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(invalid("step", "must be a positive number"));
        }
        if !(self.min_energy.is_finite() && self.min_energy >= 0.0) {
            return Err(invalid("min_energy", "must be a non-negative number"));
        }
        if !(self.max_energy.is_finite() && self.max_energy >= self.min_energy) {
            return Err(invalid("max_energy", "must not be below min_energy"));
        }
        if !(self.atomic_number >= 1.0 && self.atomic_mass >= self.atomic_number) {
            return Err(invalid("target", "needs Z >= 1 and A >= Z"));
        }

        let count = ((self.max_energy - self.min_energy) / self.step + 1e-9).floor() as usize + 1;
        // round-off would otherwise push e.g. 0.7 GeV into the 699 MeV cache bucket
        Ok((0..count)
            .map(|i| ((self.min_energy + i as f64 * self.step) * GEV * 1e9).round() / 1e9)
            .collect())
    }
}

/// Computes the cross section for every energy of `request`.
///
/// Energies are split into chunks, each filled into its own cache bound to a
/// shared estimator; the chunk caches are then merged into the returned one.
#[instrument(skip_all, name = "xsec_table_workflow")]
pub fn run(
    config: &ModelConfig,
    request: &XsecTableRequest,
    reporter: &ProgressReporter,
) -> Result<ElementXsecCache, EngineError> {
    let energies = request.energies()?;
    let estimator = Arc::new(CrossSectionEstimator::new(
        config.species,
        config.dark_photon,
        config.threshold_gev,
        config.epsilon,
    ));
    info!(
        points = energies.len(),
        atomic_mass = request.atomic_mass,
        atomic_number = request.atomic_number,
        "Computing cross-section table."
    );

    reporter.start("Cross sections", energies.len() as u64);

    #[cfg(not(feature = "parallel"))]
    let iterator = energies.chunks(CHUNK_SIZE);

    #[cfg(feature = "parallel")]
    let iterator = energies.par_chunks(CHUNK_SIZE);

    let partials = iterator
        .map(|chunk| -> Result<ElementXsecCache, CacheError> {
            let mut cache = ElementXsecCache::with_estimator(Arc::clone(&estimator));
            for &energy in chunk {
                cache.get(energy, request.atomic_mass, request.atomic_number)?;
                reporter.advance(1);
            }
            Ok(cache)
        })
        .collect::<Result<Vec<_>, CacheError>>()?;

    reporter.finish();

    let mut table = ElementXsecCache::with_estimator(estimator);
    for partial in partials {
        table.merge(partial);
    }
    info!(entries = table.len(), "Cross-section table complete.");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::DarkPhoton;
    use crate::core::units::{MEV, PICOBARN};
    use crate::engine::config::ModelConfigBuilder;
    use crate::engine::progress::Progress;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn config() -> ModelConfig {
        ModelConfigBuilder::new()
            .dark_photon(DarkPhoton::with_mass(100.0 * MEV).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn default_scan_includes_both_ends() {
        let energies = XsecTableRequest::default().energies().unwrap();
        assert_eq!(energies.len(), 41);
        assert_eq!(energies[0], 0.0);
        assert_eq!(energies[40], 4.0 * GEV);
        assert_eq!(energies[7], 700.0);
    }

    #[test]
    fn invalid_scans_are_rejected() {
        let reversed = XsecTableRequest {
            min_energy: 5.0,
            max_energy: 1.0,
            ..XsecTableRequest::default()
        };
        assert!(matches!(
            reversed.energies(),
            Err(ConfigError::InvalidValue {
                parameter: "max_energy",
                ..
            })
        ));

        let no_step = XsecTableRequest {
            step: 0.0,
            ..XsecTableRequest::default()
        };
        assert!(no_step.energies().is_err());
    }

    #[test]
    fn table_matches_direct_estimates() {
        let request = XsecTableRequest {
            min_energy: 0.0,
            max_energy: 2.0,
            step: 0.25,
            ..XsecTableRequest::default()
        };
        let advanced = AtomicU64::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::TaskAdvance { steps } = event {
                advanced.fetch_add(steps, Ordering::SeqCst);
            }
        }));

        let config = config();
        let table = run(&config, &request, &reporter).unwrap();
        drop(reporter);
        assert_eq!(table.len(), 9);
        assert_eq!(advanced.load(Ordering::SeqCst), 9);

        let estimator = CrossSectionEstimator::new(
            config.species,
            config.dark_photon,
            config.threshold_gev,
            config.epsilon,
        );
        let rows: Vec<_> = table.entries().collect();
        for row in &rows {
            let direct = estimator.compute(row.energy as f64, 183.84, 74.0);
            assert!((row.xsec_pb - direct / PICOBARN).abs() <= 1e-9 * row.xsec_pb.abs());
        }
        assert!(rows.iter().filter(|r| r.energy < 200).all(|r| r.xsec_pb == 0.0));
        assert!(rows.iter().filter(|r| r.energy >= 500).all(|r| r.xsec_pb > 0.0));
    }
}
