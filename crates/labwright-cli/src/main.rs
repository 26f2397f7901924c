//! Labwright CLI - Resolve lab systems into a bill of materials.

use anyhow::Context;
use clap::Parser;
use labwright_cli::commands;
use labwright_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)
        .with_context(|| format!("failed to load config from '{}'", config_path.display()))?;

    init_logging(cli.verbose, &config.settings.log_level);

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let output = match cli.command {
        Command::List(args) => commands::execute_list(args, &config, &formatter)?,
        Command::Show(args) => commands::execute_show(args, &config, &formatter)?,
        Command::Add(args) => commands::execute_add(args, &config, &formatter)?,
        Command::Resolve(args) => commands::execute_resolve(args, &config, &formatter).await?,
        Command::Check => commands::execute_check(&config, &formatter)?,
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter)?,
    };
    println!("{}", output);

    Ok(())
}

/// Logs go to stderr; RUST_LOG wins over -v, which wins over the config file.
fn init_logging(verbose: u8, configured: &str) {
    let fallback = match verbose {
        0 => configured,
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
