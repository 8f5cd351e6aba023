//! `sentinel config` — print the effective configuration.

use anyhow::{Context, Result};

use sentinel_core::Config;

pub fn run(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("failed to render config as YAML")?;
    print!("{yaml}");
    Ok(())
}
