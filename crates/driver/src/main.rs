//! Compiles a TOML study file into an engine input deck.

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use tether_driver::StudyFile;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(about = "Compile studies into input decks for an external study engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a study file that declares its own problem
    Compile {
        /// Path to the study file
        study: PathBuf,

        /// Write the deck here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Compile { study, output } => compile(&study, output.as_deref()),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

fn compile(path: &Path, output: Option<&Path>) -> Result<(), String> {
    let file = StudyFile::load(path).map_err(|e| e.to_string())?;
    let problem = file
        .problem
        .ok_or_else(|| format!("{} has no [problem] table to compile against", path.display()))?;

    let deck = file
        .study
        .compile(&problem)
        .map_err(|e| e.to_string())?
        .render();

    match output {
        Some(output) => {
            fs::write(output, deck).map_err(|e| format!("{}: {e}", output.display()))?;
            info!(deck = %output.display(), name = %file.name, "wrote deck");
        }
        None => print!("{deck}"),
    }
    Ok(())
}
