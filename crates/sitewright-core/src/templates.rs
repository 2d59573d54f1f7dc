//! Closed template library: one pure render function per `BlockType`.
//!
//! Render functions are total over their inputs — missing *optional* data
//! degrades to a placeholder variant, never a panic. Missing *required* data
//! is caught earlier by the resolver via `required_data_check`, so by the
//! time `render` runs the contract below holds.

use crate::profile::{day_name, BusinessProfile};
use crate::types::BlockType;
use serde_json::Value;

/// Escape text for embedding in HTML content and attribute positions.
pub fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn content_str<'a>(content: &'a Value, key: &str) -> Option<&'a str> {
    content.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn content_items<'a>(content: &'a Value, key: &str) -> Vec<&'a Value> {
    content
        .get(key)
        .and_then(Value::as_array)
        .map(|a| a.iter().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Required-field declarations
// ---------------------------------------------------------------------------

/// Returns the name of the first required field that cannot be derived from
/// the profile or the block's own content payload, or `None` if the block
/// is renderable.
pub fn required_data_check(
    block: BlockType,
    profile: &BusinessProfile,
    _content: &Value,
) -> Option<&'static str> {
    match block {
        BlockType::Hero => None,
        // A 24/7 banner without a phone number is dead weight.
        BlockType::EmergencyBanner => {
            if profile.phone.as_deref().map(str::trim).unwrap_or("").is_empty() {
                Some("phone")
            } else {
                None
            }
        }
        BlockType::ServicesGrid => {
            if profile.services.is_empty() {
                Some("services")
            } else {
                None
            }
        }
        // The widget needs at least one bookable service.
        BlockType::BookingWidget => {
            if profile.services.is_empty() {
                Some("services")
            } else {
                None
            }
        }
        BlockType::Testimonials => None,
        BlockType::FaqSection => None,
        BlockType::ContactForm => None,
        BlockType::ServiceAreaMap => {
            if profile.service_areas.is_empty() {
                Some("service_areas")
            } else {
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Render dispatch
// ---------------------------------------------------------------------------

/// Render one block to section markup. Pure: identical inputs yield
/// byte-identical output.
pub fn render(
    block: BlockType,
    profile: &BusinessProfile,
    content: &Value,
    website_id: &str,
) -> String {
    match block {
        BlockType::Hero => hero(profile, content),
        BlockType::EmergencyBanner => emergency_banner(profile, content),
        BlockType::ServicesGrid => services_grid(profile),
        BlockType::BookingWidget => booking_widget(profile),
        BlockType::Testimonials => testimonials(content),
        BlockType::FaqSection => faq_section(content),
        BlockType::ContactForm => contact_form(profile, website_id),
        BlockType::ServiceAreaMap => service_area_map(profile),
    }
}

fn hero(profile: &BusinessProfile, content: &Value) -> String {
    let headline = content_str(content, "headline")
        .map(esc)
        .unwrap_or_else(|| {
            format!(
                "{} — {} you can count on",
                esc(&profile.name),
                esc(profile.trade_label())
            )
        });
    let sub = content_str(content, "subheadline")
        .map(esc)
        .or_else(|| {
            profile
                .primary_location()
                .map(|loc| format!("Serving {} and surrounding areas", esc(&loc)))
        })
        .unwrap_or_default();
    format!(
        "<section class=\"hero\"><h1>{headline}</h1><p class=\"hero-sub\">{sub}</p></section>"
    )
}

fn emergency_banner(profile: &BusinessProfile, content: &Value) -> String {
    let phone = esc(profile.phone.as_deref().unwrap_or_default());
    let message = content_str(content, "message")
        .map(esc)
        .unwrap_or_else(|| "24/7 emergency service available".to_string());
    if profile.emergency_available() {
        format!(
            "<section class=\"emergency-banner\"><strong>{message}</strong> \
             <a href=\"tel:{phone}\">{phone}</a></section>"
        )
    } else {
        // Placeholder variant: no emergency coverage, plain call line.
        format!(
            "<section class=\"emergency-banner emergency-banner--plain\">\
             Call us: <a href=\"tel:{phone}\">{phone}</a></section>"
        )
    }
}

fn services_grid(profile: &BusinessProfile) -> String {
    let cards: String = profile
        .services
        .iter()
        .map(|s| {
            let desc = esc(s.description.as_deref().unwrap_or_default());
            let price = match (s.pricing_model, s.unit_price) {
                (crate::types::PricingModel::Quote, _) | (_, None) => "Free quote".to_string(),
                (crate::types::PricingModel::Hourly, Some(p)) => format!("${p:.0}/hr"),
                (crate::types::PricingModel::Fixed, Some(p)) => format!("From ${p:.0}"),
            };
            format!(
                "<article class=\"service-card\"><h3>{}</h3><p>{desc}</p>\
                 <span class=\"service-price\">{price}</span></article>",
                esc(&s.name)
            )
        })
        .collect();
    format!("<section class=\"services-grid\">{cards}</section>")
}

fn booking_widget(profile: &BusinessProfile) -> String {
    let options: String = profile
        .services
        .iter()
        .map(|s| format!("<option>{}</option>", esc(&s.name)))
        .collect();
    let hours: String = profile
        .open_hours()
        .iter()
        .map(|h| {
            format!(
                "<li>{} {}–{}</li>",
                day_name(h.day_of_week),
                h.open_time.as_deref().unwrap_or(""),
                h.close_time.as_deref().unwrap_or("")
            )
        })
        .collect();
    format!(
        "<section class=\"booking-widget\"><h2>Book a visit</h2>\
         <select name=\"service\">{options}</select>\
         <ul class=\"booking-hours\">{hours}</ul></section>"
    )
}

fn testimonials(content: &Value) -> String {
    let items = content_items(content, "items");
    if items.is_empty() {
        return "<section class=\"testimonials testimonials--empty\"></section>".to_string();
    }
    let quotes: String = items
        .iter()
        .map(|item| {
            let quote = item.get("quote").and_then(Value::as_str).unwrap_or("");
            let author = item.get("author").and_then(Value::as_str).unwrap_or("Customer");
            format!(
                "<blockquote><p>{}</p><cite>{}</cite></blockquote>",
                esc(quote),
                esc(author)
            )
        })
        .collect();
    format!("<section class=\"testimonials\">{quotes}</section>")
}

fn faq_section(content: &Value) -> String {
    let items = content_items(content, "items");
    if items.is_empty() {
        return "<section class=\"faq faq--empty\"></section>".to_string();
    }
    let entries: String = items
        .iter()
        .map(|item| {
            let q = item.get("question").and_then(Value::as_str).unwrap_or("");
            let a = item.get("answer").and_then(Value::as_str).unwrap_or("");
            format!(
                "<details><summary>{}</summary><p>{}</p></details>",
                esc(q),
                esc(a)
            )
        })
        .collect();
    format!("<section class=\"faq\">{entries}</section>")
}

/// The form posts the payload shape the external form-submission collaborator
/// expects: website/business identifiers plus visitor metadata fields filled
/// in client-side.
fn contact_form(profile: &BusinessProfile, website_id: &str) -> String {
    format!(
        "<section class=\"contact-form\"><form method=\"post\" action=\"/api/forms/submit\">\
         <input type=\"hidden\" name=\"website_id\" value=\"{}\"/>\
         <input type=\"hidden\" name=\"business_id\" value=\"{}\"/>\
         <input type=\"hidden\" name=\"referrer\" value=\"\"/>\
         <input type=\"hidden\" name=\"user_agent\" value=\"\"/>\
         <input name=\"name\" placeholder=\"Your name\" required/>\
         <input name=\"phone\" placeholder=\"Phone\" required/>\
         <textarea name=\"message\" placeholder=\"How can we help?\"></textarea>\
         <button type=\"submit\">Request service</button></form></section>",
        esc(website_id),
        esc(&profile.business_id)
    )
}

fn service_area_map(profile: &BusinessProfile) -> String {
    let areas: String = profile
        .service_areas
        .iter()
        .map(|a| {
            let badge = if a.emergency_services_available {
                " <span class=\"badge-emergency\">24/7</span>"
            } else {
                ""
            };
            format!(
                "<li>{} {}, {}{badge}</li>",
                esc(&a.postal_code),
                esc(&a.city),
                esc(&a.region)
            )
        })
        .collect();
    format!("<section class=\"service-area-map\"><ul>{areas}</ul></section>")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::fixtures::austin_hvac;
    use serde_json::json;

    #[test]
    fn esc_handles_markup_characters() {
        assert_eq!(esc("A&B <\"quotes\">"), "A&amp;B &lt;&quot;quotes&quot;&gt;");
    }

    #[test]
    fn render_is_deterministic() {
        let profile = austin_hvac();
        let content = json!({});
        for &block in BlockType::all() {
            let a = render(block, &profile, &content, "austin-comfort");
            let b = render(block, &profile, &content, "austin-comfort");
            assert_eq!(a, b, "{block} render is not deterministic");
        }
    }

    #[test]
    fn booking_widget_requires_a_service() {
        let mut profile = austin_hvac();
        profile.services.clear();
        assert_eq!(
            required_data_check(BlockType::BookingWidget, &profile, &json!({})),
            Some("services")
        );
    }

    #[test]
    fn emergency_banner_requires_phone() {
        let mut profile = austin_hvac();
        profile.phone = None;
        assert_eq!(
            required_data_check(BlockType::EmergencyBanner, &profile, &json!({})),
            Some("phone")
        );
    }

    #[test]
    fn testimonials_without_items_renders_placeholder() {
        let html = render(BlockType::Testimonials, &austin_hvac(), &json!({}), "w1");
        assert!(html.contains("testimonials--empty"));
    }

    #[test]
    fn testimonials_with_items_renders_quotes() {
        let content = json!({"items": [{"quote": "Fast & friendly", "author": "Dana"}]});
        let html = render(BlockType::Testimonials, &austin_hvac(), &content, "w1");
        assert!(html.contains("Fast &amp; friendly"));
        assert!(html.contains("Dana"));
    }

    #[test]
    fn hero_uses_content_headline_when_supplied() {
        let content = json!({"headline": "Stay cool, Austin"});
        let html = render(BlockType::Hero, &austin_hvac(), &content, "w1");
        assert!(html.contains("Stay cool, Austin"));
    }

    #[test]
    fn hero_falls_back_to_profile_copy() {
        let html = render(BlockType::Hero, &austin_hvac(), &json!({}), "w1");
        assert!(html.contains("Austin Comfort Co"));
        assert!(html.contains("HVAC"));
    }

    #[test]
    fn contact_form_emits_lead_payload_shape() {
        let html = render(BlockType::ContactForm, &austin_hvac(), &json!({}), "austin-comfort");
        assert!(html.contains("name=\"website_id\" value=\"austin-comfort\""));
        assert!(html.contains("name=\"business_id\" value=\"biz-42\""));
        assert!(html.contains("name=\"referrer\""));
        assert!(html.contains("name=\"user_agent\""));
    }

    #[test]
    fn services_grid_shows_fixed_price() {
        let html = render(BlockType::ServicesGrid, &austin_hvac(), &json!({}), "w1");
        assert!(html.contains("From $150"));
    }

    #[test]
    fn emergency_banner_plain_variant_without_coverage() {
        let mut profile = austin_hvac();
        profile.service_areas[0].emergency_services_available = false;
        let html = render(BlockType::EmergencyBanner, &profile, &json!({}), "w1");
        assert!(html.contains("emergency-banner--plain"));
    }
}
