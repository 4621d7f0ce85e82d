use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "simreport CLI - Compiles molecular simulation experiments (metadata, figures and analysis data) into paginated PDF reports.",
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

    /// Set the number of threads used to render plots.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a PDF report from an experiment manifest.
    Build(BuildArgs),
    /// List the attribute codes known to the metadata catalog.
    Attributes(AttributesArgs),
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    // --- Core Arguments ---
    /// Path to the experiment manifest in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path of the PDF report to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Additional attribute catalog, merged over the built-in one.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    // --- Output Overrides ---
    /// Directory receiving generated plots. Swept after the build.
    #[arg(short = 't', long, value_name = "PATH")]
    pub temp_dir: Option<PathBuf>,

    /// Build in a fresh subdirectory of the temp directory.
    #[arg(long)]
    pub isolate_temp: bool,

    /// Name printed in the report byline. Defaults to the current user.
    #[arg(short, long, value_name = "NAME")]
    pub author: Option<String>,

    // --- Layout Overrides ---
    /// Number of images per row in the analysis data table.
    #[arg(long, value_name = "INT")]
    pub columns: Option<usize>,

    /// Maximum seconds spent rendering a single plot (0 disables the limit).
    #[arg(long, value_name = "SECS")]
    pub plot_timeout: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S layout.columns=3
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `attributes` subcommand.
#[derive(Args, Debug)]
pub struct AttributesArgs {
    /// Additional attribute catalog, merged over the built-in one.
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Only list codes with a standard term.
    #[arg(long)]
    pub standard_only: bool,
}
