use crate::analysis::roster::DuplicatePolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Turns agent definition markdown into structured dossiers
#[derive(Parser, Debug)]
#[command(
    name = "dossier",
    about = "Turns agent definition markdown into structured dossiers",
    version,
    author,
    long_about = "dossier parses agent definition documents (YAML frontmatter plus markdown \
                  sections), maps their sections, scores each agent's stat card, places it \
                  in a workflow phase and detects relationships between agents."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Analyze a directory of agent documents",
        long_about = "Loads every agent document under PATH, builds the roster and prints \
                      agents, phases and relationships.\n\n\
                      Examples:\n  \
                      dossier analyze agents/\n  \
                      dossier analyze agents/ --format json -o roster.json\n  \
                      dossier analyze agents/ --duplicates replace --score-log scores.jsonl"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Inspect a single agent document",
        long_about = "Parses one document and prints its frontmatter, sections, stats and \
                      phase.\n\n\
                      Examples:\n  \
                      dossier inspect agents/architect.md\n  \
                      dossier inspect agents/architect.md --format yaml"
    )]
    Inspect(InspectArgs),

    #[command(about = "Show effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "PATH", help = "Agent document or directory of documents")]
    pub path: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'd',
        long,
        value_enum,
        default_value = "reject",
        help = "How to handle two documents with the same agent name"
    )]
    pub duplicates: DuplicatesArg,

    #[arg(
        long,
        value_name = "FILE",
        help = "Append per-agent phase and stat scoring details as JSON lines"
    )]
    pub score_log: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub limits: LimitArgs,
}

/// Loader limits that override `DOSSIER_*` environment values.
#[derive(Parser, Debug, Clone, Default)]
pub struct LimitArgs {
    #[arg(long, value_name = "BYTES", help = "Skip documents larger than this")]
    pub max_file_size: Option<u64>,

    #[arg(long, value_name = "COUNT", help = "Load at most this many documents")]
    pub max_files: Option<usize>,

    #[arg(long, value_name = "DEPTH", help = "Directory walk depth")]
    pub max_depth: Option<usize>,

    #[arg(
        long = "ext",
        value_name = "EXT",
        value_delimiter = ',',
        help = "Document extensions to load (comma separated)"
    )]
    pub extensions: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    #[arg(value_name = "FILE", help = "Agent document to inspect")]
    pub file: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatesArg {
    Reject,
    Replace,
    Skip,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(arg: DuplicatesArg) -> Self {
        match arg {
            DuplicatesArg::Reject => DuplicatePolicy::Reject,
            DuplicatesArg::Replace => DuplicatePolicy::Replace,
            DuplicatesArg::Skip => DuplicatePolicy::Skip,
        }
    }
}
