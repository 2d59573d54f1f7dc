pub mod compose;
pub mod deploy;
pub mod serve;
pub mod status;

use anyhow::Context;
use sitewright_core::profile::BusinessProfile;
use std::path::Path;

/// Surface the server's `{"error": ...}` body instead of a bare status code.
pub fn api_error(err: ureq::Error) -> anyhow::Error {
    match err {
        ureq::Error::Status(code, resp) => {
            let detail = resp
                .into_json::<serde_json::Value>()
                .ok()
                .and_then(|v| v["error"].as_str().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {code}"));
            anyhow::anyhow!("server returned {code}: {detail}")
        }
        other => anyhow::anyhow!(other),
    }
}

/// Load a business profile from a YAML or JSON file, by extension.
pub fn load_profile(path: &Path) -> anyhow::Result<BusinessProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading profile {}", path.display()))?;
    let profile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("parsing profile {}", path.display()))?,
        _ => serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing profile {}", path.display()))?,
    };
    Ok(profile)
}
