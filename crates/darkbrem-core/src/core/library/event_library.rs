use super::outgoing::OutgoingKinematics;
use super::source::LibrarySource;
use super::LibraryError;
use itertools::Itertools;
use rand::Rng;
use std::path::Path;
use tracing::info;

/// Hard cap on forward-only resampling attempts.
pub const MAX_RESAMPLE_ITERATIONS: usize = 10_000;

/// All samples recorded at one incident energy, plus the read cursor into them.
#[derive(Debug, Clone)]
struct EnergyBucket {
    energy: f64,
    samples: Box<[OutgoingKinematics]>,
    cursor: usize,
}

impl EnergyBucket {
    fn next(&mut self) -> &OutgoingKinematics {
        if self.cursor >= self.samples.len() {
            self.cursor = 0;
        }
        let sample = &self.samples[self.cursor];
        self.cursor += 1;
        sample
    }
}

/// In-memory library of pre-generated dark brem vertices.
///
/// Samples are grouped into buckets by the incident energy they were generated
/// at. Buckets are stored in ascending energy order in a flat arena and each
/// carries its own read cursor, so drawing a sample is a binary search
/// followed by an index bump.
#[derive(Debug, Clone)]
pub struct EventLibrary {
    buckets: Vec<EnergyBucket>,
}

impl EventLibrary {
    /// Groups `samples` by incident energy and places every bucket's cursor at
    /// a uniformly random offset.
    ///
    /// The order of samples sharing an incident energy is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Empty`] if `samples` is empty.
    pub fn new(
        mut samples: Vec<OutgoingKinematics>,
        rng: &mut impl Rng,
    ) -> Result<Self, LibraryError> {
        if samples.is_empty() {
            return Err(LibraryError::Empty {
                path: String::from("<memory>"),
            });
        }

        samples.sort_by(|a, b| a.incident_energy.total_cmp(&b.incident_energy));
        let buckets = samples
            .into_iter()
            .chunk_by(|s| s.incident_energy.to_bits())
            .into_iter()
            .map(|(_, group)| {
                let samples: Box<[OutgoingKinematics]> = group.collect();
                EnergyBucket {
                    energy: samples[0].incident_energy,
                    samples,
                    cursor: 0,
                }
            })
            .collect();

        let mut library = Self { buckets };
        library.randomize_cursors(rng);
        Ok(library)
    }

    /// Reads `path` with `source` and builds a library from the result.
    ///
    /// # Errors
    ///
    /// Propagates read errors and returns [`LibraryError::Empty`] if the path
    /// holds no samples.
    pub fn load(
        source: &impl LibrarySource,
        path: &Path,
        rng: &mut impl Rng,
    ) -> Result<Self, LibraryError> {
        let samples = source.read_from_path(path)?;
        if samples.is_empty() {
            return Err(LibraryError::Empty {
                path: path.display().to_string(),
            });
        }
        let library = Self::new(samples, rng)?;
        info!(
            path = %path.display(),
            samples = library.len(),
            energies = library.num_energies(),
            "Loaded event library."
        );
        Ok(library)
    }

    /// Checks that every sample's A' (`center_momentum - lepton`) has
    /// invariant mass `mass` [GeV] to within a relative `1e-3`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::MassMismatch`] for the first offending sample.
    pub fn validate_dark_photon_mass(&self, mass: f64) -> Result<(), LibraryError> {
        let tolerance = (1e-3 * mass).max(1e-6);
        for sample in self.iter() {
            let found = sample.dark_photon().m();
            if (found - mass).abs() > tolerance {
                return Err(LibraryError::MassMismatch {
                    expected: mass,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Moves every cursor to a fresh uniformly random offset.
    pub fn randomize_cursors(&mut self, rng: &mut impl Rng) {
        for bucket in &mut self.buckets {
            bucket.cursor = rng.random_range(0..bucket.samples.len());
        }
    }

    /// Index of the bucket used for `incident_energy`: the lowest energy at or
    /// above it, or the highest energy available.
    ///
    /// Scaling therefore always goes down from a higher-energy sample.
    fn bucket_index(&self, incident_energy: f64) -> usize {
        let idx = self
            .buckets
            .partition_point(|bucket| bucket.energy < incident_energy);
        idx.min(self.buckets.len() - 1)
    }

    /// Incident energy [GeV] of the bucket that would serve `incident_energy`.
    pub fn sampling_energy(&self, incident_energy: f64) -> f64 {
        self.buckets[self.bucket_index(incident_energy)].energy
    }

    /// Returns the next sample for `incident_energy` [GeV] and advances that
    /// bucket's cursor, wrapping at the end.
    pub fn next_sample(&mut self, incident_energy: f64) -> OutgoingKinematics {
        let idx = self.bucket_index(incident_energy);
        *self.buckets[idx].next()
    }

    /// Ascending list of the incident energies present.
    pub fn energies(&self) -> impl Iterator<Item = f64> + '_ {
        self.buckets.iter().map(|b| b.energy)
    }

    /// `(incident energy, number of samples)` for every bucket.
    pub fn summary(&self) -> Vec<(f64, usize)> {
        self.buckets
            .iter()
            .map(|b| (b.energy, b.samples.len()))
            .collect()
    }

    /// Every sample, bucket by bucket in ascending energy.
    pub fn iter(&self) -> impl Iterator<Item = &OutgoingKinematics> {
        self.buckets.iter().flat_map(|b| b.samples.iter())
    }

    pub fn num_energies(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.samples.len()).sum()
    }

    /// Always `false`; an event library cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Resampling bound for forward-only scaling: the smallest bucket size,
    /// capped at [`MAX_RESAMPLE_ITERATIONS`].
    pub fn max_resample_iterations(&self) -> usize {
        self.buckets
            .iter()
            .map(|b| b.samples.len())
            .min()
            .unwrap_or(0)
            .min(MAX_RESAMPLE_ITERATIONS)
    }
}
