use crate::deploy::{HealthPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ComposeConfig
// ---------------------------------------------------------------------------

/// Versioned configuration passed explicitly into every composition run.
/// There is no implicit global lookup: templates only see what this carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Base domain under which sites go live, e.g. `sites.example.com`
    /// yields `https://<website_id>.sites.example.com`.
    #[serde(default = "default_domain_base")]
    pub site_domain_base: String,

    /// Template pool version baked into every artifact.
    #[serde(default = "default_template_version")]
    pub template_version: String,

    /// Whether a hidden (invisible) block still contributes its JSON-LD
    /// schema. Hiding a testimonials block shouldn't silently drop its
    /// Review markup, so this defaults to true.
    #[serde(default = "default_true")]
    pub hidden_blocks_emit_schema: bool,

    /// Generate one page per distinct service in addition to the
    /// service-area pages.
    #[serde(default = "default_true")]
    pub service_detail_pages: bool,

    #[serde(default)]
    pub publish_retry: RetryPolicy,

    #[serde(default)]
    pub health_check: HealthPolicy,
}

fn default_domain_base() -> String {
    "sites.sitewright.dev".to_string()
}

fn default_template_version() -> String {
    "v1".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            site_domain_base: default_domain_base(),
            template_version: default_template_version(),
            hidden_blocks_emit_schema: default_true(),
            service_detail_pages: default_true(),
            publish_retry: RetryPolicy::default(),
            health_check: HealthPolicy::default(),
        }
    }
}

impl ComposeConfig {
    /// The canonical live URL for a website under this configuration.
    pub fn live_url(&self, website_id: &str) -> String {
        format!("https://{website_id}.{}", self.site_domain_base)
    }

    /// Canonical URL for one route of a website.
    pub fn page_url(&self, website_id: &str, route: &str) -> String {
        let base = self.live_url(website_id);
        if route == "/" {
            base
        } else {
            format!("{base}{route}")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = ComposeConfig::default();
        assert!(cfg.hidden_blocks_emit_schema);
        assert!(cfg.service_detail_pages);
        assert_eq!(cfg.template_version, "v1");
    }

    #[test]
    fn page_url_for_home_is_bare_domain() {
        let cfg = ComposeConfig::default();
        assert_eq!(
            cfg.page_url("acme-hvac", "/"),
            "https://acme-hvac.sites.sitewright.dev"
        );
        assert_eq!(
            cfg.page_url("acme-hvac", "/services/hvac-repair"),
            "https://acme-hvac.sites.sitewright.dev/services/hvac-repair"
        );
    }

    #[test]
    fn yaml_roundtrip_with_defaults() {
        let cfg: ComposeConfig = serde_yaml::from_str("site_domain_base: sites.test\n").unwrap();
        assert_eq!(cfg.site_domain_base, "sites.test");
        assert!(cfg.hidden_blocks_emit_schema);
        assert_eq!(cfg.publish_retry.max_attempts, 5);
    }
}
