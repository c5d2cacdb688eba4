//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use adam_model::RuleSetVersion;
use adam_output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "adsl",
    version,
    about = "Derive the ADaM subject-level dataset (ADSL) from SDTM transport files",
    long_about = "Derive the ADaM subject-level dataset (ADSL) from SDTM transport files.\n\n\
                  Reads DM, EX and DS (plus optional SUPP-- qualifiers) from a data\n\
                  directory and writes adsl.csv and/or adsl.xpt."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include subject identifiers and dates in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive ADSL from a data directory.
    Run(RunArgs),

    /// Print the lookup tables and column list of a rule set.
    Rules(RulesArgs),
}

/// Rule set selection shared by both commands.
#[derive(Parser, Clone)]
pub struct RuleArgs {
    /// Built-in rule set.
    #[arg(long = "rules", value_enum, default_value = "standard")]
    pub rules: RulesArg,

    /// Load the rule set from a TOML file instead of a built-in one.
    #[arg(long = "rules-file", value_name = "PATH", conflicts_with = "rules")]
    pub rules_file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory holding dm.xpt, ex.xpt, ds.xpt and optional SUPP--.xpt files.
    #[arg(value_name = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Output directory for generated files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub rule_args: RuleArgs,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormatArg,

    /// Derive and validate without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct RulesArgs {
    #[command(flatten)]
    pub rule_args: RuleArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RulesArg {
    Standard,
    Pilot,
    PopulationFlags,
    Baseline,
}

impl From<RulesArg> for RuleSetVersion {
    fn from(value: RulesArg) -> Self {
        match value {
            RulesArg::Standard => Self::Standard,
            RulesArg::Pilot => Self::Pilot,
            RulesArg::PopulationFlags => Self::PopulationFlags,
            RulesArg::Baseline => Self::Baseline,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Xpt,
    Both,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Csv => Self::Csv,
            OutputFormatArg::Xpt => Self::Xpt,
            OutputFormatArg::Both => Self::Both,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
