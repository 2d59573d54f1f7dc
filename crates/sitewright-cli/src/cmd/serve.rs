use std::path::Path;

use anyhow::Context;
use sitewright_core::config::ComposeConfig;

pub fn run(
    port: u16,
    registry: &Path,
    control_base: String,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_yaml::from_str::<ComposeConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ComposeConfig::default(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        tokio::select! {
            res = sitewright_server::serve(registry, control_base, config, port) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
