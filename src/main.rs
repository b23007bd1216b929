use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use portal_deploy::cli::Deployer;
use portal_deploy::config;
use portal_deploy::docker::ComposeStack;
use portal_deploy::git::GitSourceControl;
use portal_deploy::ui::{self, TerminalPrompter};

#[derive(Parser)]
#[command(
    name = "portal-deploy",
    version,
    about = "Deploy matching frontend and backend releases with docker compose"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy the latest (or a selected) compatible version
    Deploy,
    /// Stop the stack and optionally remove images and checkouts
    Destroy,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;

    let source = GitSourceControl::new();
    let stack = ComposeStack::new(&config);
    let prompter = TerminalPrompter::new();
    let deployer = Deployer::new(&config, &source, &stack, &prompter);

    match args.command {
        Command::Deploy => {
            let session = deployer.deploy()?;
            println!(
                "\nDeployed {}{}",
                session.choice.label(),
                if session.warnings.is_empty() {
                    String::new()
                } else {
                    format!(" with {} warning(s)", session.warnings.len())
                }
            );
        }
        Command::Destroy => {
            deployer.destroy()?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
