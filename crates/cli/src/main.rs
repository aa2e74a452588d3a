mod commands;

use clap::Parser;
use commands::{Cmd, Command};

/// Anvil CLI
///
/// Anvil patches the forge routine so that the enchantment it applies comes from
/// a player-facing carousel instead of a random roll. It can print the patched
/// routine, report which routines were patched, dump generated tooltips and run
/// an interactive forge.
#[derive(Parser)]
#[command(name = "anvil")]
#[command(about = "Anvil: choose what the forge enchants")]
struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the Anvil CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The interactive forge owns the terminal and sets up its own logging.
    if !cli.command.is_interactive() {
        let level = if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    cli.command.execute().await
}
