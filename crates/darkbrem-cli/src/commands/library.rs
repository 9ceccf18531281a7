use crate::cli::{LibraryArgs, LibraryCommands};
use crate::error::{CliError, Result};
use darkbrem::core::library::{CsvLibrary, EventLibrary, LibraryError, write_library_csv};
use darkbrem::core::particle::DarkPhoton;
use darkbrem::engine::error::EngineError;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

pub async fn run(args: LibraryArgs) -> Result<()> {
    match args.command {
        LibraryCommands::Summary { path, ap_mass } => {
            handle_summary(&path, ap_mass)?;
        }
        LibraryCommands::Export { path, output } => {
            handle_export(&path, &output)?;
        }
    }
    Ok(())
}

fn load(path: &Path) -> Result<EventLibrary> {
    info!("Loading event library from {:?}", path);
    EventLibrary::load(&CsvLibrary, path, &mut rand::rng()).map_err(library_error)
}

fn library_error(e: LibraryError) -> CliError {
    CliError::DarkBrem(EngineError::from(e))
}

fn handle_summary(path: &Path, ap_mass: Option<f64>) -> Result<()> {
    let library = load(path)?;

    println!("Event library: {}", path.display());
    println!("  {:>14}  {:>10}", "Energy [GeV]", "Samples");
    for (energy, count) in library.summary() {
        println!("  {:>14.4}  {:>10}", energy, count);
    }
    println!(
        "  {} samples over {} incident energies",
        library.len(),
        library.num_energies()
    );

    if let Some(mass) = ap_mass {
        let dark_photon = DarkPhoton::with_mass(mass).map_err(|e| CliError::Argument(e.to_string()))?;
        library
            .validate_dark_photon_mass(dark_photon.mass_gev())
            .map_err(library_error)?;
        println!("✓ Every sample has an A' mass of {} MeV.", mass);
    }
    Ok(())
}

fn handle_export(path: &Path, output: &Path) -> Result<()> {
    let library = load(path)?;
    let file = File::create(output)?;
    write_library_csv(library.iter(), BufWriter::new(file)).map_err(library_error)?;
    println!(
        "✓ {} samples written to: {}",
        library.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkbrem::core::kinematics::FourMomentum;
    use darkbrem::core::library::OutgoingKinematics;

    fn sample(incident: f64) -> OutgoingKinematics {
        let lepton = FourMomentum::new(0.5 * incident, 0.01, 0.0, (0.25 * incident * incident - 1e-4).sqrt());
        let ap_pz = (0.25 * incident * incident - 0.01 - 1e-4).sqrt();
        let ap = FourMomentum::new(0.5 * incident, -0.01, 0.0, ap_pz);
        OutgoingKinematics::from_products(lepton, ap, incident)
    }

    #[test]
    fn export_merges_a_directory_into_one_sorted_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut high = Vec::new();
        write_library_csv(&[sample(8.0), sample(8.0)], &mut high).unwrap();
        let mut low = Vec::new();
        write_library_csv(&[sample(4.0)], &mut low).unwrap();
        std::fs::write(dir.path().join("a_high.csv"), high).unwrap();
        std::fs::write(dir.path().join("b_low.csv"), low).unwrap();

        let output = dir.path().join("merged.csv");
        handle_export(dir.path(), &output).unwrap();

        let merged = load(&output).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.summary(), vec![(4.0, 1), (8.0, 2)]);
        let incident: Vec<f64> = merged.iter().map(|s| s.incident_energy).collect();
        assert_eq!(incident, vec![4.0, 8.0, 8.0]);
    }

    #[test]
    fn summary_rejects_a_foreign_dark_photon_mass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.csv");
        let mut buffer = Vec::new();
        write_library_csv(&[sample(4.0)], &mut buffer).unwrap();
        std::fs::write(&path, buffer).unwrap();

        assert!(handle_summary(&path, None).is_ok());
        assert!(matches!(
            handle_summary(&path, Some(500.0)),
            Err(CliError::DarkBrem(EngineError::Library {
                source: LibraryError::MassMismatch { .. }
            }))
        ));
    }

    #[test]
    fn missing_library_is_reported() {
        let result = load(Path::new("/no/such/library.csv"));
        assert!(matches!(result, Err(CliError::DarkBrem(_))));
    }
}
