//! Sitepack CLI
//!
//! Compiles a blog directory into Rust source for an embedded asset registry.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for sitepack.
#[derive(Parser)]
#[command(
    name = "sitepack",
    version,
    about = "Compile a blog into an embeddable asset registry"
)]
struct Cli {
    /// Site root directory
    #[arg(short, long, default_value = ".")]
    site: PathBuf,

    /// Path to configuration file [default: <site>/sitepack.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Compile the site and write the registry source
    Build {
        /// Output file for the generated registry source
        #[arg(short, long, default_value = "registry.rs")]
        output: PathBuf,
    },
    /// Compile the site and list the registry without writing it
    Check,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    sitepack::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { output } => {
            sitepack::cmd::build::run(&cli.site, cli.config.as_deref(), &output)?;
        }
        Commands::Check => {
            sitepack::cmd::check::run(&cli.site, cli.config.as_deref())?;
        }
    }

    Ok(())
}
