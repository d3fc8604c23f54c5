use std::io::Write;

use anyhow::Result;
use clap::Parser;
use gs_core::config::{RenderConfig, load_config};

pub mod app;
pub mod cli;
pub mod input;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    cli.validate()?;

    // 3. Charger la config, puis les overrides CLI
    let mut config = resolve_config(&cli)?;
    app::apply_overrides(&cli, &mut config)?;

    // 4. Lire les entrées
    let layers = cli
        .inputs
        .iter()
        .map(|source| input::read_input(source))
        .collect::<Result<Vec<_>>>()?;

    // 5. Rendu
    let mut out = std::io::BufWriter::new(std::io::stdout().lock());
    app::run(layers, &cli.value, cli.paginate, &config, &mut out)?;
    out.flush()?;
    Ok(())
}

fn resolve_config(cli: &cli::Cli) -> Result<RenderConfig> {
    match cli.config {
        Some(ref path) => load_config(path),
        None => Ok(RenderConfig::default()),
    }
}
