use dossier::cli::commands::{CliArgs, Commands};
use dossier::cli::handlers::{handle_analyze, handle_config, handle_inspect};
use dossier::util::{init_logging, LoggingConfig};
use dossier::VERSION;

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("dossier v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args),
        Commands::Inspect(inspect_args) => handle_inspect(inspect_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}
