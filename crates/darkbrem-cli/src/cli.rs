use clap::{Args, Parser, Subcommand};
use darkbrem::engine::config::ScalingMethod;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "g4db - Dark bremsstrahlung cross sections and library-driven recoil kinematics.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate dark brem cross sections over an energy range and write them to a CSV table.
    Xsec(XsecArgs),
    /// Scale library samples to an incident energy and write the recoil leptons to CSV.
    ///
    /// The incident lepton is taken to travel along +z just before it dark brems.
    Scample(ScampleArgs),
    /// Inspect or re-export an event library.
    Library(LibraryArgs),
}

/// Model options shared by every subcommand that builds a model.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Mass of the dark photon in MeV (defaults to 100 for electrons and 1000 for muons).
    #[arg(short = 'M', long, value_name = "MEV")]
    pub ap_mass: Option<f64>,

    /// Use muons as the incident lepton rather than electrons.
    #[arg(long)]
    pub muons: bool,

    /// Kinetic mixing strength.
    #[arg(long, value_name = "FLOAT")]
    pub epsilon: Option<f64>,

    /// Minimum lepton energy in GeV for a dark brem to happen.
    #[arg(long, value_name = "GEV")]
    pub threshold: Option<f64>,
}

/// Arguments for the `xsec` subcommand.
#[derive(Args, Debug)]
pub struct XsecArgs {
    /// Path for the output cross-section table.
    #[arg(short, long, default_value = "xsec.csv", value_name = "PATH")]
    pub output: PathBuf,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Python-like arange of kinetic energies in GeV: STOP, START STOP or START STOP STEP.
    /// The default start is 0 and the default step is 0.1.
    #[arg(long, num_args = 1..=3, value_name = "GEV")]
    pub energy: Option<Vec<f64>>,

    /// Target element, either as a symbol (e.g. 'W') or as 'Z A'.
    #[arg(long, num_args = 1..=2, value_name = "TARGET")]
    pub target: Option<Vec<String>>,
}

/// Arguments for the `scample` subcommand.
#[derive(Args, Debug)]
pub struct ScampleArgs {
    /// Event library to load: a CSV file or a directory of CSV files.
    #[arg(short = 'L', long = "db-lib", value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// Path for the output recoil table.
    #[arg(short, long, default_value = "scaled.csv", value_name = "PATH")]
    pub output: PathBuf,

    /// Optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Incident lepton energy in GeV (defaults to 4 for electrons and 100 for muons).
    #[arg(short = 'E', long, value_name = "GEV")]
    pub incident_energy: Option<f64>,

    /// Number of dark brems to simulate (defaults to 100).
    #[arg(short = 'N', long, value_name = "INT")]
    pub num_events: Option<usize>,

    /// Scaling method: forward_only, cm_scaling or undefined.
    #[arg(short, long, value_name = "METHOD")]
    pub method: Option<ScalingMethod>,

    /// Upper bound on forward-only resampling attempts.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Seed for the random number generator. Drawn from the OS when omitted.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}

/// Arguments for the `library` subcommand.
#[derive(Args, Debug)]
pub struct LibraryArgs {
    #[command(subcommand)]
    pub command: LibraryCommands,
}

#[derive(Subcommand, Debug)]
pub enum LibraryCommands {
    /// List the sampled incident energies and the number of samples at each.
    Summary {
        /// Event library: a CSV file or a directory of CSV files.
        #[arg(required = true)]
        path: PathBuf,

        /// Also check that every sample was generated with this A' mass [MeV].
        #[arg(short = 'M', long, value_name = "MEV")]
        ap_mass: Option<f64>,
    },
    /// Merge a library into a single CSV file, sorted by incident energy.
    Export {
        /// Event library: a CSV file or a directory of CSV files.
        #[arg(required = true)]
        path: PathBuf,

        /// Path for the merged library.
        #[arg(short, long, required = true, value_name = "PATH")]
        output: PathBuf,
    },
}
