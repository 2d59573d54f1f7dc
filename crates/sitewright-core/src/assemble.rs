use crate::artifact::{ComposedPage, RenderedSection, SiteArtifact, HOME_ROUTE};
use crate::blocks::{self, ContentBlockSelection};
use crate::config::ComposeConfig;
use crate::error::{Result, SiteError};
use crate::profile::BusinessProfile;
use crate::seo::{self, PageType};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// PagePlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedPage {
    Home,
    /// Index into `profile.service_areas`.
    ServiceArea(usize),
    /// Index into `profile.services`.
    ServiceDetail(usize),
}

/// The set of routes a website gets: home always, one page per service area,
/// and (when enabled) one per distinct service.
#[derive(Debug, Clone)]
pub struct PagePlan {
    pub routes: Vec<(String, PlannedPage)>,
}

/// Lowercase URL slug: alphanumerics kept, runs of anything else collapse to
/// a single hyphen.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut last_hyphen = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

impl PagePlan {
    pub fn for_profile(profile: &BusinessProfile, config: &ComposeConfig) -> Self {
        let mut routes = vec![(HOME_ROUTE.to_string(), PlannedPage::Home)];
        for (i, area) in profile.service_areas.iter().enumerate() {
            routes.push((
                format!("/service-areas/{}", slugify(&area.postal_code)),
                PlannedPage::ServiceArea(i),
            ));
        }
        if config.service_detail_pages {
            for (i, service) in profile.services.iter().enumerate() {
                routes.push((
                    format!("/services/{}", slugify(&service.name)),
                    PlannedPage::ServiceDetail(i),
                ));
            }
        }
        Self { routes }
    }
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Compose every planned route into a `SiteArtifact`.
///
/// `snapshot` pins every page's `created_at`, so re-assembling unchanged
/// inputs with the same snapshot yields a byte-identical artifact.
///
/// Invariants checked before returning: exactly one home route, unique route
/// URLs, unique page titles (duplicate titles are an SEO conflict).
pub fn assemble(
    profile: &BusinessProfile,
    selection: &ContentBlockSelection,
    plan: &PagePlan,
    config: &ComposeConfig,
    snapshot: DateTime<Utc>,
) -> Result<SiteArtifact> {
    let resolved = blocks::resolve(profile, selection)?;
    let website_id = &selection.website_id;

    let mut pages: BTreeMap<String, ComposedPage> = BTreeMap::new();
    for (route, planned) in &plan.routes {
        let page_type = match planned {
            PlannedPage::Home => PageType::Home,
            PlannedPage::ServiceArea(i) => {
                let area = profile.service_areas.get(*i).ok_or_else(|| {
                    SiteError::Assembly(format!("plan references missing service area {i}"))
                })?;
                PageType::ServiceArea(area)
            }
            PlannedPage::ServiceDetail(i) => {
                let service = profile.services.get(*i).ok_or_else(|| {
                    SiteError::Assembly(format!("plan references missing service {i}"))
                })?;
                PageType::ServiceDetail(service)
            }
        };

        let seo = seo::compose(profile, &resolved, page_type, website_id, config);
        let body_sections = resolved
            .iter()
            .filter(|b| b.visible)
            .map(|b| RenderedSection {
                block_type: b.block_type,
                html: b.html.clone(),
            })
            .collect();

        let page = ComposedPage {
            page_url: config.page_url(website_id, route),
            title: seo.title,
            meta_description: seo.meta_description,
            h1_heading: seo.h1_heading,
            body_sections,
            schema_markup: seo.schema_markup,
            target_keywords: seo.target_keywords,
            generation_method: seo.generation_method,
            word_count: seo.word_count,
            created_at: snapshot,
        };

        if pages.insert(route.clone(), page).is_some() {
            return Err(SiteError::Assembly(format!(
                "duplicate route '{route}' in page plan"
            )));
        }
    }

    if !pages.contains_key(HOME_ROUTE) {
        return Err(SiteError::Assembly("home route missing from plan".into()));
    }

    // Route keys are unique by map construction; URLs derive 1:1 from
    // routes, so only titles still need a pairwise check.
    let mut seen_titles: BTreeMap<&str, &str> = BTreeMap::new();
    for (route, page) in &pages {
        if let Some(first) = seen_titles.insert(page.title.as_str(), route.as_str()) {
            return Err(SiteError::DuplicateTitle {
                title: page.title.clone(),
                first: first.to_string(),
                second: route.clone(),
            });
        }
    }

    Ok(SiteArtifact {
        website_id: website_id.clone(),
        business_id: profile.business_id.clone(),
        template_version: config.template_version.clone(),
        pages,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
