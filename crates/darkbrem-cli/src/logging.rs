use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{Layer, filter::LevelFilter, fmt, prelude::*, registry::LookupSpan};

/// Console level chosen by `-v` repetitions. `-q` still lets errors through.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// The log file never records less than `INFO`, so library load summaries
/// and model print-outs land in it even under a quiet console.
fn file_level(console: LevelFilter) -> LevelFilter {
    console.max(LevelFilter::INFO)
}

fn console_layer<S>(level: LevelFilter) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(level)
}

fn file_layer<S>(file: File, level: LevelFilter) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_filter(level)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let console = console_level(verbosity, quiet);
    let log_file = log_file
        .as_deref()
        .map(File::create)
        .transpose()
        .map_err(CliError::Io)?;

    tracing_subscriber::registry()
        .with(console_layer(console))
        .with(log_file.map(|file| file_layer(file, file_level(console))))
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn verbosity_maps_to_console_levels() {
        assert_eq!(console_level(0, false), LevelFilter::WARN);
        assert_eq!(console_level(1, false), LevelFilter::INFO);
        assert_eq!(console_level(2, false), LevelFilter::DEBUG);
        assert_eq!(console_level(7, false), LevelFilter::TRACE);
        assert_eq!(console_level(2, true), LevelFilter::ERROR);
    }

    #[test]
    fn file_level_is_never_quieter_than_info() {
        assert_eq!(file_level(LevelFilter::ERROR), LevelFilter::INFO);
        assert_eq!(file_level(LevelFilter::WARN), LevelFilter::INFO);
        assert_eq!(file_level(LevelFilter::TRACE), LevelFilter::TRACE);
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!("This is a warning");
        info!("This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn quiet_run_still_records_library_summary_in_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("g4db.log");
        let file = File::create(&log_path).unwrap();

        let level = file_level(console_level(0, true));
        let subscriber = tracing_subscriber::registry().with(file_layer(file, level));
        tracing::subscriber::with_default(subscriber, || {
            info!(energies = 3, samples = 60, "Loaded event library.");
            debug!(energy_gev = 4.0, samples = 20, "Event library bucket.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Loaded event library."));
        assert!(content.contains("samples=60"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("Event library bucket."));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
