use crate::engine::model::DarkBremModel;
use crate::engine::progress::ProgressReporter;
use rand::Rng;
use serde::Serialize;
use std::io::Write;
use tracing::{info, instrument};

/// Reports are batched so the callback is not hit once per event.
const REPORT_EVERY: usize = 1_000;

/// Recoil lepton of one scaled sample, in MeV, relative to an incident lepton
/// along +z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecoilRecord {
    pub recoil_energy: f64,
    pub recoil_px: f64,
    pub recoil_py: f64,
    pub recoil_pz: f64,
}

/// Scales `n_events` library samples to `incident_energy` [GeV].
///
/// The lepton mass is taken from the model's configured species.
#[instrument(skip_all, name = "scample_workflow", fields(incident_energy = incident_energy, n_events = n_events))]
pub fn run(
    model: &mut DarkBremModel,
    incident_energy: f64,
    n_events: usize,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Vec<RecoilRecord> {
    let lepton_mass = model.config().species.mass_gev();
    info!(
        lepton_mass_gev = lepton_mass,
        sampling_energy_gev = model.library().sampling_energy(incident_energy),
        "Scaling library samples."
    );

    reporter.start("Scaling samples", n_events as u64);
    let mut records = Vec::with_capacity(n_events);
    for i in 0..n_events {
        let recoil = model.scample(incident_energy, lepton_mass, rng);
        records.push(RecoilRecord {
            recoil_energy: recoil.energy,
            recoil_px: recoil.momentum.x,
            recoil_py: recoil.momentum.y,
            recoil_pz: recoil.momentum.z,
        });
        if (i + 1) % REPORT_EVERY == 0 {
            reporter.advance(REPORT_EVERY as u64);
        }
    }
    reporter.advance((n_events % REPORT_EVERY) as u64);
    reporter.finish();
    records
}

/// Writes records as CSV with a `recoil_energy,recoil_px,recoil_py,recoil_pz`
/// header.
pub fn write_records(records: &[RecoilRecord], writer: impl Write) -> std::io::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        csv_writer.write_record(["recoil_energy", "recoil_px", "recoil_py", "recoil_pz"])?;
    }
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()
}
