//! Config command

use anyhow::{Context, Result};
use camino::Utf8Path;
use remi_core::EngineConfig;

use crate::cli::ConfigArgs;

pub fn run(args: ConfigArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = EngineConfig::load(config_path)
        .context("Failed to load engine configuration")?
        .with_env_overrides()?;

    match &config.config_path {
        Some(path) => eprintln!("# loaded from {}", path),
        None => eprintln!("# no remi.yaml found, showing defaults"),
    }

    let rendered = if args.json {
        serde_json::to_string_pretty(&config.config)?
    } else {
        serde_yaml_ng::to_string(&config.config)?
    };
    println!("{}", rendered.trim_end());
    println!(
        "# effective registration timeout: {}ms",
        config.registration_timeout().as_millis()
    );
    Ok(())
}
