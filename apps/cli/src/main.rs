mod commands;
mod watch;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use gozer::{BuildOptions, DEFAULT_CONFIG_FILE};
use log::error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gozer")]
#[command(version, about = "Gozer - a fast & simple static site generator", long_about = None)]
struct Cli {
    /// Directory to use as root of project
    #[arg(long, short, global = true, default_value = ".")]
    root: PathBuf,

    /// Path to configuration file, relative to the root
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Include pages marked as drafts
    #[arg(long, global = true)]
    drafts: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates a new site structure in the root directory
    New,
    /// Builds the site into <root>/build
    Build {
        /// Delete the output directory before building
        #[arg(long)]
        clean: bool,
    },
    /// Builds the site, serves it over HTTP and rebuilds on changes
    Serve {
        #[arg(long, default_value = "localhost:8080")]
        listen: String,
    },
    /// Builds the site and rebuilds on changes
    Watch,
}

fn print_usage() {
    if let Err(error) = Cli::command().print_help() {
        error!("{error}");
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if error.kind() == ErrorKind::InvalidSubcommand => {
            print_usage();
            return;
        }
        Err(error) => error.exit(),
    };

    let Some(command) = cli.command else {
        print_usage();
        return;
    };

    let options = BuildOptions::new(&cli.root)
        .config_file(&cli.config)
        .include_drafts(cli.drafts);

    let result = match command {
        Commands::New => commands::new_site(&cli.root, &cli.config),
        Commands::Build { clean } => commands::build_site(&options.clean(clean)),
        Commands::Serve { listen } => commands::serve_site(&options, &listen).await,
        Commands::Watch => commands::watch_site(&options).await,
    };

    if let Err(error) = result {
        error!("{error}");
        std::process::exit(1);
    }
}
