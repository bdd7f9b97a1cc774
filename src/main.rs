use anyhow::Result;
use clap::Parser;
use proofcheck::cli::{Cli, Commands};
use proofcheck::commands::{self, GlobalOptions};
use proofcheck::observability::{init_tracing, install_panic_hook};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbosity);
    install_panic_hook();

    let global = GlobalOptions {
        config: cli.config.clone(),
        quiet: cli.quiet,
        verbosity: cli.verbosity,
    };

    let exit_code = match cli.command {
        Commands::Check {
            document,
            output,
            timeout,
        } => commands::handle_check(&global, document, output, timeout)?,
        Commands::Configure {
            language,
            edits,
            output,
        } => commands::handle_configure(&global, language, edits, output)?,
        Commands::Trigger {
            event,
            document,
            output,
            edits,
        } => commands::handle_trigger(&global, &event, document, edits, output)?,
        Commands::Rules { language, format } => {
            commands::handle_rules(&global, language, format)?;
            0
        }
        Commands::Init { force } => {
            commands::init_config(force)?;
            0
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
