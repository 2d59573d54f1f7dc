//! Page-level SEO metadata and JSON-LD structured data.
//!
//! Composition is deterministic: titles and descriptions come from fixed
//! templates parameterized by the profile, and schema objects are derived
//! from the profile plus the resolved block sequence. The composer records
//! which path produced the copy it was given; it never calls a generative
//! service itself.

use crate::blocks::ResolvedBlock;
use crate::config::ComposeConfig;
use crate::profile::{day_schema_token, BusinessProfile, Service, ServiceArea};
use crate::types::{BlockType, GenerationMethod};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

pub const MAX_DESCRIPTION_CHARS: usize = 160;

// ---------------------------------------------------------------------------
// PageType / SeoPageData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum PageType<'a> {
    Home,
    ServiceArea(&'a ServiceArea),
    ServiceDetail(&'a Service),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoPageData {
    pub title: String,
    pub meta_description: String,
    pub h1_heading: String,
    pub target_keywords: Vec<String>,
    pub schema_markup: Vec<Value>,
    pub generation_method: GenerationMethod,
    pub word_count: usize,
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Truncate to at most `max` characters without breaking mid-word,
/// appending an ellipsis when anything was cut.
pub fn truncate_on_word(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let budget: String = s.chars().take(max - 1).collect();
    let cut = match budget.rfind(char::is_whitespace) {
        Some(i) => budget[..i].trim_end(),
        None => budget.trim_end(),
    };
    format!("{cut}…")
}

/// Strip HTML tags, leaving text content separated by spaces.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn word_count(blocks: &[ResolvedBlock]) -> usize {
    blocks
        .iter()
        .filter(|b| b.visible)
        .map(|b| strip_tags(&b.html).split_whitespace().count())
        .sum()
}

fn llm_copy_present(blocks: &[ResolvedBlock]) -> bool {
    blocks.iter().any(|b| {
        b.content
            .get("generated_copy")
            .and_then(Value::as_str)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    })
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

pub fn compose(
    profile: &BusinessProfile,
    blocks: &[ResolvedBlock],
    page: PageType<'_>,
    website_id: &str,
    config: &ComposeConfig,
) -> SeoPageData {
    let trade = profile.trade_label();
    let location = profile
        .primary_location()
        .unwrap_or_else(|| "your area".to_string());

    let (title, description, h1) = match page {
        PageType::Home => (
            format!("{} | {trade} in {location}", profile.name),
            format!(
                "{} provides trusted {trade} services in {location}. \
                 Licensed, local, and ready to help — request a visit today.",
                profile.name
            ),
            format!("{trade} services in {location}"),
        ),
        PageType::ServiceArea(area) => (
            format!("{trade} in {}, {} | {}", area.city, area.region, profile.name),
            format!(
                "Need {trade} help in {}, {}? {} serves the {} area{}.",
                area.city,
                area.region,
                profile.name,
                area.postal_code,
                if area.emergency_services_available {
                    " with 24/7 emergency response"
                } else {
                    ""
                }
            ),
            format!("{trade} in {}, {}", area.city, area.region),
        ),
        PageType::ServiceDetail(service) => (
            format!("{} in {location} | {}", service.name, profile.name),
            service.description.clone().unwrap_or_else(|| {
                format!(
                    "{} offers {} throughout {location}. Get a free quote.",
                    profile.name, service.name
                )
            }),
            service.name.clone(),
        ),
    };

    let mut keywords = vec![trade.to_lowercase()];
    match page {
        PageType::Home => {
            keywords.extend(profile.services.iter().map(|s| s.name.to_lowercase()));
            if let Some(area) = profile.service_areas.first() {
                keywords.push(format!("{} {}", trade.to_lowercase(), area.city.to_lowercase()));
            }
        }
        PageType::ServiceArea(area) => {
            keywords.push(format!("{} {}", trade.to_lowercase(), area.city.to_lowercase()));
            keywords.push(area.postal_code.clone());
        }
        PageType::ServiceDetail(service) => {
            keywords.push(service.name.to_lowercase());
        }
    }
    // Order-preserving dedup; duplicates are not necessarily adjacent
    // (e.g. a service named after the trade itself).
    let mut seen = HashSet::new();
    keywords.retain(|k| seen.insert(k.clone()));

    let generation_method = if llm_copy_present(blocks) {
        GenerationMethod::Llm
    } else if profile.services.is_empty() && profile.trade.is_none() {
        GenerationMethod::Fallback
    } else {
        GenerationMethod::Template
    };

    SeoPageData {
        title,
        meta_description: truncate_on_word(&description, MAX_DESCRIPTION_CHARS),
        h1_heading: h1,
        target_keywords: keywords,
        schema_markup: schema_markup(profile, blocks, page, website_id, config),
        generation_method,
        word_count: word_count(blocks),
    }
}

// ---------------------------------------------------------------------------
// JSON-LD builders
// ---------------------------------------------------------------------------

/// Full schema sequence for a page: LocalBusiness always, then conditional
/// FAQPage/Service/Review contributions from the block sequence. Hidden
/// blocks contribute iff `config.hidden_blocks_emit_schema`.
fn schema_markup(
    profile: &BusinessProfile,
    blocks: &[ResolvedBlock],
    page: PageType<'_>,
    website_id: &str,
    config: &ComposeConfig,
) -> Vec<Value> {
    let mut markup = vec![local_business_schema(profile, website_id, config)];

    let contributes =
        |b: &ResolvedBlock| b.visible || config.hidden_blocks_emit_schema;

    let mut services_emitted = false;
    for block in blocks.iter().filter(|b| contributes(b)) {
        match block.block_type {
            BlockType::FaqSection => {
                if let Some(schema) = faq_schema(&block.content) {
                    markup.push(schema);
                }
            }
            BlockType::Testimonials => {
                if let Some(schema) = review_schema(profile, &block.content) {
                    markup.push(schema);
                }
            }
            BlockType::ServicesGrid | BlockType::BookingWidget => {
                // A second grid/widget block must not duplicate the set.
                if services_emitted {
                    continue;
                }
                services_emitted = true;
                // One Service object per offered service; on a detail page
                // only that page's service.
                let services: Vec<&Service> = match page {
                    PageType::ServiceDetail(s) => vec![s],
                    _ => profile.services.iter().collect(),
                };
                for service in services {
                    markup.push(service_schema(profile, service));
                }
            }
            _ => {}
        }
    }
    markup
}

fn local_business_schema(
    profile: &BusinessProfile,
    website_id: &str,
    config: &ComposeConfig,
) -> Value {
    let opening_hours: Vec<Value> = profile
        .open_hours()
        .iter()
        .map(|h| {
            json!({
                "@type": "OpeningHoursSpecification",
                "dayOfWeek": day_schema_token(h.day_of_week),
                "opens": h.open_time,
                "closes": h.close_time,
            })
        })
        .collect();
    let area_served: Vec<Value> = profile
        .service_areas
        .iter()
        .map(|a| {
            json!({
                "@type": "City",
                "name": a.city,
                "postalCode": a.postal_code,
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "LocalBusiness",
        "name": profile.name,
        "telephone": profile.phone,
        "email": profile.email,
        "address": profile.address,
        "url": config.live_url(website_id),
        "areaServed": area_served,
        "openingHoursSpecification": opening_hours,
    })
}

fn service_schema(profile: &BusinessProfile, service: &Service) -> Value {
    let mut schema = json!({
        "@context": "https://schema.org",
        "@type": "Service",
        "name": service.name,
        "provider": { "@type": "LocalBusiness", "name": profile.name },
    });
    if let Some(desc) = &service.description {
        schema["description"] = json!(desc);
    }
    if let Some(price) = service.unit_price {
        schema["offers"] = json!({
            "@type": "Offer",
            "price": format!("{price:.2}"),
            "priceCurrency": "USD",
        });
    }
    schema
}

fn faq_schema(content: &Value) -> Option<Value> {
    let items = content.get("items")?.as_array()?;
    if items.is_empty() {
        return None;
    }
    let entities: Vec<Value> = items
        .iter()
        .filter_map(|item| {
            let q = item.get("question")?.as_str()?;
            let a = item.get("answer")?.as_str()?;
            Some(json!({
                "@type": "Question",
                "name": q,
                "acceptedAnswer": { "@type": "Answer", "text": a },
            }))
        })
        .collect();
    if entities.is_empty() {
        return None;
    }
    Some(json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    }))
}

fn review_schema(profile: &BusinessProfile, content: &Value) -> Option<Value> {
    let items = content.get("items")?.as_array()?;
    let reviews: Vec<Value> = items
        .iter()
        .filter_map(|item| {
            let quote = item.get("quote")?.as_str()?;
            let author = item.get("author").and_then(Value::as_str).unwrap_or("Customer");
            let mut review = json!({
                "@type": "Review",
                "reviewBody": quote,
                "author": { "@type": "Person", "name": author },
                "itemReviewed": { "@type": "LocalBusiness", "name": profile.name },
            });
            if let Some(rating) = item.get("rating").and_then(Value::as_f64) {
                review["reviewRating"] = json!({
                    "@type": "Rating",
                    "ratingValue": rating,
                    "bestRating": 5,
                });
            }
            Some(review)
        })
        .collect();
    if reviews.is_empty() {
        return None;
    }
    Some(json!({
        "@context": "https://schema.org",
        "@graph": reviews,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{resolve, BlockSelection, ContentBlockSelection};
    use crate::profile::fixtures::austin_hvac;
    use serde_json::json;

    fn resolved(blocks: Vec<BlockSelection>) -> Vec<ResolvedBlock> {
        let sel = ContentBlockSelection {
            website_id: "austin-comfort".into(),
            blocks,
        };
        resolve(&austin_hvac(), &sel).unwrap()
    }

    fn block(block_type: BlockType, order: u32, content: Value) -> BlockSelection {
        BlockSelection {
            block_type,
            visible: true,
            order,
            content,
        }
    }

    #[test]
    fn truncate_never_breaks_mid_word() {
        let long = "emergency furnace and air conditioner repair for homes ".repeat(6);
        let cut = truncate_on_word(&long, MAX_DESCRIPTION_CHARS);
        assert!(cut.chars().count() <= MAX_DESCRIPTION_CHARS);
        assert!(cut.ends_with('…'));
        // Last word before the ellipsis is a complete dictionary word.
        let body = cut.trim_end_matches('…').trim_end();
        assert!(long.split_whitespace().any(|w| w == body.split_whitespace().last().unwrap()));
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_on_word("short text", 160), "short text");
    }

    #[test]
    fn home_title_names_business_trade_and_location() {
        let cfg = ComposeConfig::default();
        let blocks = resolved(vec![block(BlockType::Hero, 0, json!({}))]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "austin-comfort", &cfg);
        assert_eq!(seo.title, "Austin Comfort Co | HVAC in Austin, TX");
        assert!(seo.meta_description.chars().count() <= MAX_DESCRIPTION_CHARS);
        assert_eq!(seo.generation_method, GenerationMethod::Template);
        assert!(seo.word_count > 0);
    }

    #[test]
    fn local_business_schema_always_first() {
        let cfg = ComposeConfig::default();
        let blocks = resolved(vec![block(BlockType::Hero, 0, json!({}))]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "austin-comfort", &cfg);
        assert_eq!(seo.schema_markup[0]["@type"], "LocalBusiness");
        assert_eq!(
            seo.schema_markup[0]["url"],
            "https://austin-comfort.sites.sitewright.dev"
        );
        let hours = seo.schema_markup[0]["openingHoursSpecification"]
            .as_array()
            .unwrap();
        assert_eq!(hours.len(), 5);
        assert_eq!(hours[0]["dayOfWeek"], "Mo");
    }

    #[test]
    fn faq_block_adds_faq_schema() {
        let cfg = ComposeConfig::default();
        let faq = json!({"items": [{"question": "Do you service heat pumps?", "answer": "Yes."}]});
        let blocks = resolved(vec![block(BlockType::FaqSection, 0, faq)]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "austin-comfort", &cfg);
        assert!(seo
            .schema_markup
            .iter()
            .any(|s| s["@type"] == "FAQPage"));
    }

    #[test]
    fn services_grid_adds_service_schema_once() {
        let cfg = ComposeConfig::default();
        let blocks = resolved(vec![
            block(BlockType::ServicesGrid, 0, json!({})),
            block(BlockType::BookingWidget, 1, json!({})),
        ]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "austin-comfort", &cfg);
        let service_count = seo
            .schema_markup
            .iter()
            .filter(|s| s["@type"] == "Service")
            .count();
        assert_eq!(service_count, 1, "grid + widget must not duplicate Service schema");
    }

    #[test]
    fn blocks_after_services_grid_still_contribute_schema() {
        let cfg = ComposeConfig::default();
        let faq = json!({"items": [{"question": "Do you service heat pumps?", "answer": "Yes."}]});
        let review = json!({"items": [{"quote": "Great work", "author": "Sam", "rating": 5.0}]});
        let blocks = resolved(vec![
            block(BlockType::ServicesGrid, 0, json!({})),
            block(BlockType::FaqSection, 1, faq),
            block(BlockType::Testimonials, 2, review),
        ]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "austin-comfort", &cfg);
        assert!(seo.schema_markup.iter().any(|s| s["@type"] == "Service"));
        assert!(seo.schema_markup.iter().any(|s| s["@type"] == "FAQPage"));
        assert!(seo.schema_markup.iter().any(|s| s.get("@graph").is_some()));
    }

    #[test]
    fn keywords_have_no_duplicates_even_non_adjacent() {
        let cfg = ComposeConfig::default();
        let mut profile = austin_hvac();
        // A service named after the trade duplicates the trade keyword with
        // another service keyword in between.
        profile.services.push(crate::profile::Service {
            name: "HVAC".into(),
            description: None,
            pricing_model: crate::types::PricingModel::Quote,
            unit_price: None,
        });
        let blocks = resolved(vec![block(BlockType::Hero, 0, json!({}))]);
        let seo = compose(&profile, &blocks, PageType::Home, "austin-comfort", &cfg);
        let mut sorted = seo.target_keywords.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), seo.target_keywords.len(), "{:?}", seo.target_keywords);
        assert_eq!(seo.target_keywords[0], "hvac");
    }

    #[test]
    fn hidden_testimonials_keep_review_schema_by_default() {
        let cfg = ComposeConfig::default();
        let content = json!({"items": [{"quote": "Great work", "author": "Sam", "rating": 5.0}]});
        let mut sel_block = block(BlockType::Testimonials, 0, content);
        sel_block.visible = false;
        let blocks = resolved(vec![sel_block]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "austin-comfort", &cfg);
        assert!(seo.schema_markup.iter().any(|s| s.get("@graph").is_some()));
    }

    #[test]
    fn hidden_testimonials_drop_schema_when_configured() {
        let cfg = ComposeConfig {
            hidden_blocks_emit_schema: false,
            ..ComposeConfig::default()
        };
        let content = json!({"items": [{"quote": "Great work", "author": "Sam"}]});
        let mut sel_block = block(BlockType::Testimonials, 0, content);
        sel_block.visible = false;
        let blocks = resolved(vec![sel_block]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "austin-comfort", &cfg);
        assert!(seo.schema_markup.iter().all(|s| s.get("@graph").is_none()));
    }

    #[test]
    fn hidden_blocks_excluded_from_word_count() {
        let cfg = ComposeConfig::default();
        let mut hidden = block(BlockType::ServicesGrid, 1, json!({}));
        hidden.visible = false;
        let with_hidden = resolved(vec![block(BlockType::Hero, 0, json!({})), hidden]);
        let without = resolved(vec![block(BlockType::Hero, 0, json!({}))]);
        let a = compose(&austin_hvac(), &with_hidden, PageType::Home, "w1", &cfg);
        let b = compose(&austin_hvac(), &without, PageType::Home, "w1", &cfg);
        assert_eq!(a.word_count, b.word_count);
    }

    #[test]
    fn generated_copy_marks_llm_method() {
        let cfg = ComposeConfig::default();
        let blocks = resolved(vec![block(
            BlockType::Hero,
            0,
            json!({"generated_copy": "Beat the Texas heat with same-day AC repair."}),
        )]);
        let seo = compose(&austin_hvac(), &blocks, PageType::Home, "w1", &cfg);
        assert_eq!(seo.generation_method, GenerationMethod::Llm);
    }

    #[test]
    fn bare_profile_marks_fallback_method() {
        let cfg = ComposeConfig::default();
        let mut profile = austin_hvac();
        profile.services.clear();
        profile.trade = None;
        let sel = ContentBlockSelection {
            website_id: "w1".into(),
            blocks: vec![block(BlockType::Hero, 0, json!({}))],
        };
        let blocks = resolve(&profile, &sel).unwrap();
        let seo = compose(&profile, &blocks, PageType::Home, "w1", &cfg);
        assert_eq!(seo.generation_method, GenerationMethod::Fallback);
    }

    #[test]
    fn service_area_page_mentions_postal_code() {
        let cfg = ComposeConfig::default();
        let profile = austin_hvac();
        let area = &profile.service_areas[0];
        let blocks = resolved(vec![block(BlockType::Hero, 0, json!({}))]);
        let seo = compose(&profile, &blocks, PageType::ServiceArea(area), "w1", &cfg);
        assert!(seo.meta_description.contains("78701"));
        assert!(seo.meta_description.contains("24/7"));
        assert_eq!(seo.h1_heading, "HVAC in Austin, TX");
    }

    #[test]
    fn service_detail_page_uses_service_description() {
        let cfg = ComposeConfig::default();
        let profile = austin_hvac();
        let service = &profile.services[0];
        let blocks = resolved(vec![block(BlockType::Hero, 0, json!({}))]);
        let seo = compose(&profile, &blocks, PageType::ServiceDetail(service), "w1", &cfg);
        assert_eq!(seo.title, "HVAC Repair in Austin, TX | Austin Comfort Co");
        assert!(seo.meta_description.contains("Diagnosis and repair"));
    }
}
