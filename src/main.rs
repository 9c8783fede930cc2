//! Stackwise CLI
//!
//! Command-line front end for the Stackwise architecture stack editor.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use stackwise::cli::commands;
use stackwise::cli::{Cli, Commands};
use stackwise::config::Config;
use stackwise::Result;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Stackwise v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    let Some(cmd) = cli.command else {
        println!("Stackwise v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for available commands");
        return Ok(());
    };

    if let Err(e) = handle_command(cmd, &config) {
        if let Some(suggestion) = e.recovery_suggestion() {
            eprintln!("hint: {}", suggestion);
        }
        let code = e.error_code();
        return Err(anyhow::Error::new(e).context(code));
    }

    Ok(())
}

fn handle_command(cmd: Commands, config: &Config) -> Result<()> {
    match cmd {
        Commands::Init { path, template } => commands::init(&path, &template),
        Commands::Summary { path } => commands::summary(&path, config),
        Commands::Costs { path, layer } => commands::costs(&path, layer.as_deref(), config),
        Commands::Levels { path } => commands::levels(&path),
        Commands::Layout { path, json } => commands::layout_positions(&path, json, config),
        Commands::Validate { path, repair } => commands::validate(&path, repair),
        Commands::Actions { path, sort, top } => commands::actions(&path, &sort, top, config),
        Commands::Forecast { path } => commands::forecast_costs(&path),
        Commands::Recommend { path } => commands::recommend(&path, config),
        Commands::AddLayer { path, name, parent } => {
            commands::add_layer(&path, &name, parent.as_deref())
        }
        Commands::Connect {
            path,
            from,
            to,
            connection_type,
        } => commands::connect(&path, &from, &to, &connection_type),
        Commands::Undo { path } => commands::undo(&path),
        Commands::Redo { path } => commands::redo(&path),
        Commands::History { path } => commands::show_history(&path),
    }
}
