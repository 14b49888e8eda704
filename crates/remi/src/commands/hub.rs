//! Hub command

use anyhow::{Context, Result};
use camino::Utf8Path;
use remi_core::EngineConfig;
use remi_engine::{Remi, RemiBuilder};
use remi_extensions::{DecorateExtension, ExposeExtension, RealmExtension};
use std::time::Duration;
use tracing::info;

use crate::cli::HubArgs;
use crate::hub::{demo_plugins, Hub};

pub async fn run(args: HubArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = EngineConfig::load(config_path)
        .context("Failed to load engine configuration")?
        .with_env_overrides()?;

    let remi = build_engine(&config, args.timeout_ms);
    info!(
        timeout_ms = u64::try_from(remi.registration_timeout().as_millis()).unwrap_or(u64::MAX),
        "Registering hub plugins"
    );

    let hub = Hub::new(remi);
    hub.register_with(
        demo_plugins(args.say_times)?,
        config.config.shared_options.clone(),
    )
    .await?;

    println!("done");
    Ok(())
}

/// Engine configured from `config`, with every stock extension installed
fn build_engine(config: &EngineConfig, timeout_ms: Option<u64>) -> Remi {
    let mut builder = RemiBuilder::from_config(config)
        .extension(DecorateExtension, config.extension_options("decorate"))
        .extension(ExposeExtension, config.extension_options("expose"))
        .extension(RealmExtension, config.extension_options("realm"));

    if let Some(ms) = timeout_ms {
        builder = builder.registration_timeout(Duration::from_millis(ms));
    }
    builder.build()
}
