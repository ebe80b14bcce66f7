use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ocrlens_core::config::AppConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start from an existing config file instead of the defaults
    #[arg(long)]
    pub from: Option<PathBuf>,
}

/// Print or save an AppConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = match &args.from {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AppConfig::default(),
    };
    let toml_str = config.to_toml()?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
