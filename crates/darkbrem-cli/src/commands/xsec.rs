use crate::cli::XsecArgs;
use crate::config::PartialConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use darkbrem::engine::error::EngineError;
use darkbrem::engine::progress::ProgressReporter;
use darkbrem::workflows;
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

pub async fn run(args: XsecArgs) -> Result<()> {
    let partial_config = PartialConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let (model_config, request) = partial_config.merge_xsec(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Calculating cross sections from {} to {} GeV in steps of {} GeV (Z = {}, A = {})...",
        request.min_energy,
        request.max_energy,
        request.step,
        request.atomic_number,
        request.atomic_mass
    );

    let table = tokio::task::block_in_place(|| {
        workflows::xsec_table::run(&model_config, &request, &reporter)
    })?;

    let file = File::create(&args.output)?;
    table
        .write_table(BufWriter::new(file))
        .map_err(|e| CliError::DarkBrem(EngineError::from(e)))?;

    println!("{}", model_config);
    println!(
        "✓ {} cross sections written to: {}",
        table.len(),
        args.output.display()
    );
    Ok(())
}
