use crate::cli::ScampleArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use darkbrem::engine::model::DarkBremModel;
use darkbrem::engine::progress::ProgressReporter;
use darkbrem::workflows::scample;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

pub async fn run(args: ScampleArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_scample(&args)?;

    let mut rng = match settings.seed {
        Some(seed) => {
            info!(seed, "Seeding random number generator.");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let records = tokio::task::block_in_place(|| -> Result<_> {
        let mut model = DarkBremModel::new(settings.model.clone(), &mut rng)?;
        println!("{}", model.config());
        println!("  {:<16} {}", "Lepton Mass [MeV]:", model.config().species.mass());
        println!("  {:<16} {}", "A' Mass [MeV]:", model.config().dark_photon.mass());
        Ok(scample::run(
            &mut model,
            settings.incident_energy,
            settings.num_events,
            &mut rng,
            &reporter,
        ))
    })?;

    let file = File::create(&args.output)?;
    scample::write_records(&records, BufWriter::new(file))?;

    println!(
        "✓ {} scaled recoils at {} GeV written to: {}",
        records.len(),
        settings.incident_energy,
        args.output.display()
    );
    Ok(())
}
