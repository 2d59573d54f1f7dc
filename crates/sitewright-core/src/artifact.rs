use crate::types::{BlockType, GenerationMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// RenderedSection / ComposedPage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedSection {
    pub block_type: BlockType,
    pub html: String,
}

/// The fully resolved, metadata-annotated representation of one route.
/// Immutable once produced: a changed profile or template version requires
/// regeneration, never in-place mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedPage {
    pub page_url: String,
    pub title: String,
    pub meta_description: String,
    pub h1_heading: String,
    pub body_sections: Vec<RenderedSection>,
    pub schema_markup: Vec<Value>,
    pub target_keywords: Vec<String>,
    pub generation_method: GenerationMethod,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

impl ComposedPage {
    /// Render the `<head>` metadata fields plus JSON-LD scripts consumed by
    /// the hosting platform's renderer.
    pub fn head_markup(&self) -> String {
        let mut head = format!(
            "<title>{}</title>\n<meta name=\"description\" content=\"{}\"/>\n\
             <meta name=\"keywords\" content=\"{}\"/>\n\
             <link rel=\"canonical\" href=\"{}\"/>\n\
             <meta property=\"og:title\" content=\"{}\"/>\n\
             <meta property=\"og:description\" content=\"{}\"/>\n\
             <meta property=\"og:url\" content=\"{}\"/>\n",
            crate::templates::esc(&self.title),
            crate::templates::esc(&self.meta_description),
            crate::templates::esc(&self.target_keywords.join(", ")),
            self.page_url,
            crate::templates::esc(&self.title),
            crate::templates::esc(&self.meta_description),
            self.page_url,
        );
        for schema in &self.schema_markup {
            head.push_str("<script type=\"application/ld+json\">");
            head.push_str(&schema.to_string());
            head.push_str("</script>\n");
        }
        head
    }

    /// Full page markup: head metadata + ordered body sections.
    pub fn full_markup(&self) -> String {
        let body: String = self.body_sections.iter().map(|s| s.html.as_str()).collect();
        format!(
            "<!doctype html>\n<html><head>\n{}</head>\n<body>\n<main>{}</main>\n</body></html>",
            self.head_markup(),
            body
        )
    }
}

// ---------------------------------------------------------------------------
// SiteArtifact
// ---------------------------------------------------------------------------

/// The complete, packaged set of composed pages for one website. Owned by
/// the assembler until handed to the orchestrator; read-only thereafter.
///
/// Routes use a `BTreeMap` so iteration order — and therefore artifact
/// serialization — is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteArtifact {
    pub website_id: String,
    pub business_id: String,
    pub template_version: String,
    pub pages: BTreeMap<String, ComposedPage>,
}

pub const HOME_ROUTE: &str = "/";

impl SiteArtifact {
    pub fn home_page(&self) -> Option<&ComposedPage> {
        self.pages.get(HOME_ROUTE)
    }

    pub fn routes(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(url: &str, title: &str) -> ComposedPage {
        ComposedPage {
            page_url: url.to_string(),
            title: title.to_string(),
            meta_description: "desc".into(),
            h1_heading: "h1".into(),
            body_sections: vec![RenderedSection {
                block_type: BlockType::Hero,
                html: "<section class=\"hero\"><h1>hi</h1></section>".into(),
            }],
            schema_markup: vec![json!({"@type": "LocalBusiness", "name": "Acme"})],
            target_keywords: vec!["hvac".into()],
            generation_method: GenerationMethod::Template,
            word_count: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn head_markup_contains_metadata_and_jsonld() {
        let head = page("https://acme.sites.test", "Acme | HVAC").head_markup();
        assert!(head.contains("<title>Acme | HVAC</title>"));
        assert!(head.contains("rel=\"canonical\" href=\"https://acme.sites.test\""));
        assert!(head.contains("og:title"));
        assert!(head.contains("application/ld+json"));
        assert!(head.contains("LocalBusiness"));
    }

    #[test]
    fn full_markup_wraps_sections_in_main() {
        let markup = page("https://acme.sites.test", "Acme").full_markup();
        assert!(markup.starts_with("<!doctype html>"));
        assert!(markup.contains("<main><section class=\"hero\">"));
    }

    #[test]
    fn routes_iterate_in_stable_order() {
        let mut pages = BTreeMap::new();
        pages.insert("/service-areas/78701".to_string(), page("u1", "t1"));
        pages.insert("/".to_string(), page("u2", "t2"));
        pages.insert("/services/repair".to_string(), page("u3", "t3"));
        let artifact = SiteArtifact {
            website_id: "w".into(),
            business_id: "b".into(),
            template_version: "v1".into(),
            pages,
        };
        assert_eq!(
            artifact.routes(),
            vec!["/", "/service-areas/78701", "/services/repair"]
        );
        assert!(artifact.home_page().is_some());
    }
}
