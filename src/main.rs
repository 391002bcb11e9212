mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use fertiplan::logic::{detect_tier, generate_fertilization_plan, generate_liming_plan};
use fertiplan::{AppConfig, FertiPlanError, InputDocument};
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<FertiPlanError>() {
            Some(err) if err.is_validation() => eprintln!("Invalid input: {}", err),
            _ => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

/// RUST_LOG wins; otherwise -v/-vv pick the level. Logs go to stderr.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(path: &Path) -> Result<InputDocument> {
    InputDocument::load(path).with_context(|| format!("Failed to read parcel document {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Init { path } = &cli.command {
        AppConfig::setup_interactive(path.as_deref()).context("Interactive setup failed")?;
        return Ok(());
    }

    let app_config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let engine = &app_config.engine;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Lime { input } => {
            let doc = load_document(input)?;
            let plan = generate_liming_plan(&doc.liming_request()?, engine)?;
            output::liming(&mut out, &plan, cli.format)?;
        }
        Commands::Plan { input } => {
            let doc = load_document(input)?;
            let plan = generate_fertilization_plan(&doc.plan_input(&app_config.prices), engine)?;
            output::fertilization(&mut out, &plan, cli.format)?;
        }
        Commands::Tier { input } => {
            let doc = load_document(input)?;
            let tier = detect_tier(
                &doc.parcel,
                &doc.analyses,
                &doc.crop_rotation,
                &doc.fertilization_history,
                engine,
            )?;
            output::tier(&mut out, &output::TierReport::new(&doc.parcel.name, tier), cli.format)?;
        }
        Commands::Config => {
            write!(out, "{}", app_config.to_yaml()?)?;
        }
        Commands::Init { .. } => {}
    }

    out.flush()?;
    Ok(())
}
