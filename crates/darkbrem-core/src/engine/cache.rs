use crate::core::units::PICOBARN;
use crate::core::xsec::{CrossSection, CrossSectionEstimator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

const MAX_A: u64 = 1_000;
const MAX_E: u64 = 1_500_000;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cross-section cache was not given an estimator to compute cross sections with")]
    Unbound,
    #[error("Cross-section cache is already bound to an estimator")]
    AlreadyBound,
    #[error("Cross-section table I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cross-section table CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the published cross-section table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XsecTableRow {
    #[serde(rename = "A [au]")]
    pub atomic_mass: u64,
    #[serde(rename = "Z [protons]")]
    pub atomic_number: u64,
    #[serde(rename = "Energy [MeV]")]
    pub energy: u64,
    #[serde(rename = "Xsec [pb]")]
    pub xsec_pb: f64,
}

/// Memoizes per-atom cross sections by element and energy.
///
/// Kinetic energies are truncated to whole MeV and `A`, `Z` to integers before
/// being packed into one key, so every energy within the same MeV shares the
/// value computed for the first one queried. Entries are never evicted.
#[derive(Debug, Clone)]
pub struct ElementXsecCache<E = CrossSectionEstimator> {
    entries: BTreeMap<u64, f64>,
    estimator: Option<Arc<E>>,
}

impl<E> Default for ElementXsecCache<E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            estimator: None,
        }
    }
}

impl<E: CrossSection> ElementXsecCache<E> {
    /// Creates an unbound cache; every miss fails until [`bind`](Self::bind).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_estimator(estimator: Arc<E>) -> Self {
        Self {
            entries: BTreeMap::new(),
            estimator: Some(estimator),
        }
    }

    /// Binds the estimator used on a cache miss. A cache is bound at most once.
    pub fn bind(&mut self, estimator: Arc<E>) -> Result<(), CacheError> {
        if self.estimator.is_some() {
            return Err(CacheError::AlreadyBound);
        }
        self.estimator = Some(estimator);
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.estimator.is_some()
    }

    pub fn estimator(&self) -> Option<&Arc<E>> {
        self.estimator.as_ref()
    }

    /// Packed key for a kinetic energy [MeV] on element `(A, Z)`.
    pub fn key(energy: f64, atomic_mass: f64, atomic_number: f64) -> u64 {
        let energy_key = energy as u64;
        let a_key = atomic_mass as u64;
        let z_key = atomic_number as u64;
        (z_key * MAX_A + a_key) * MAX_E + energy_key
    }

    /// Cross section per atom for kinetic energy `energy` [MeV], computing and
    /// storing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unbound`] on a miss when no estimator is bound.
    pub fn get(&mut self, energy: f64, atomic_mass: f64, atomic_number: f64) -> Result<f64, CacheError> {
        let key = Self::key(energy, atomic_mass, atomic_number);
        if let Some(&xsec) = self.entries.get(&key) {
            return Ok(xsec);
        }
        let estimator = self.estimator.as_ref().ok_or(CacheError::Unbound)?;
        let xsec = estimator.cross_section_per_atom(energy, atomic_mass, atomic_number);
        trace!(energy, atomic_mass, atomic_number, xsec, "Cross-section cache miss.");
        self.entries.insert(key, xsec);
        Ok(xsec)
    }

    /// Moves every entry of `other` not already present into `self`.
    pub fn merge(&mut self, other: ElementXsecCache<E>) {
        for (key, xsec) in other.entries {
            self.entries.entry(key).or_insert(xsec);
        }
    }
}

impl<E> ElementXsecCache<E> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached values as table rows, ordered by `(Z, A, energy)`.
    pub fn entries(&self) -> impl Iterator<Item = XsecTableRow> + '_ {
        self.entries.iter().map(|(&key, &xsec)| {
            let energy = key % MAX_E;
            let atomic_mass = (key / MAX_E) % MAX_A;
            let atomic_number = key / MAX_E / MAX_A;
            XsecTableRow {
                atomic_mass,
                atomic_number,
                energy,
                xsec_pb: xsec / PICOBARN,
            }
        })
    }

    /// Writes the cache as a CSV table with columns
    /// `A [au],Z [protons],Energy [MeV],Xsec [pb]`.
    pub fn write_table(&self, writer: impl Write) -> Result<(), CacheError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if self.entries.is_empty() {
            csv_writer.write_record(["A [au]", "Z [protons]", "Energy [MeV]", "Xsec [pb]"])?;
        }
        for row in self.entries() {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Parses a table written by [`ElementXsecCache::write_table`].
pub fn read_table(reader: impl Read) -> Result<Vec<XsecTableRow>, CacheError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows = csv_reader.deserialize().collect::<Result<Vec<XsecTableRow>, _>>()?;
    Ok(rows)
}
