use crate::error::{Result, SiteError};
use crate::profile::BusinessProfile;
use crate::templates;
use crate::types::BlockType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Selection types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSelection {
    pub block_type: BlockType,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub order: u32,
    /// Free-form content slot payload (testimonials items, custom headlines,
    /// externally generated copy). Interpreted per block type.
    #[serde(default)]
    pub content: serde_json::Value,
}

fn default_visible() -> bool {
    true
}

/// The ordered block selection for one website.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlockSelection {
    pub website_id: String,
    pub blocks: Vec<BlockSelection>,
}

// ---------------------------------------------------------------------------
// ResolvedBlock
// ---------------------------------------------------------------------------

/// One renderable section. Invisible blocks are resolved and kept here so
/// metadata derivation can still see them; only the rendered sequence
/// excludes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedBlock {
    pub block_type: BlockType,
    pub visible: bool,
    pub order: u32,
    pub html: String,
    pub content: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Website id validation
// ---------------------------------------------------------------------------

static WEBSITE_ID_RE: OnceLock<Regex> = OnceLock::new();

fn website_id_re() -> &'static Regex {
    WEBSITE_ID_RE
        .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_website_id(id: &str) -> Result<()> {
    if id.len() > 63 || !website_id_re().is_match(id) {
        return Err(SiteError::InvalidWebsiteId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolve a website's block selection against a business profile.
///
/// Pure and deterministic: identical `(profile, selection)` input yields
/// byte-identical output. Fails with a validation error when an order value
/// repeats or a block's required data cannot be derived; missing optional
/// data renders the block's placeholder variant instead.
pub fn resolve(
    profile: &BusinessProfile,
    selection: &ContentBlockSelection,
) -> Result<Vec<ResolvedBlock>> {
    validate_website_id(&selection.website_id)?;

    let mut seen_orders = HashSet::new();
    for block in &selection.blocks {
        if !seen_orders.insert(block.order) {
            return Err(SiteError::DuplicateBlockOrder {
                website_id: selection.website_id.clone(),
                order: block.order,
            });
        }
    }

    let mut resolved = Vec::with_capacity(selection.blocks.len());
    for block in &selection.blocks {
        if let Some(field) = templates::required_data_check(block.block_type, profile, &block.content)
        {
            return Err(SiteError::MissingBlockData {
                block: block.block_type.to_string(),
                field: field.to_string(),
            });
        }
        let html = templates::render(
            block.block_type,
            profile,
            &block.content,
            &selection.website_id,
        );
        resolved.push(ResolvedBlock {
            block_type: block.block_type,
            visible: block.visible,
            order: block.order,
            html,
            content: block.content.clone(),
        });
    }
    resolved.sort_by_key(|b| b.order);
    Ok(resolved)
}

/// The default block lineup for a new website: every block type the profile
/// can support, in a sensible page order.
pub fn default_selection(profile: &BusinessProfile, website_id: &str) -> ContentBlockSelection {
    let lineup = [
        BlockType::Hero,
        BlockType::EmergencyBanner,
        BlockType::ServicesGrid,
        BlockType::BookingWidget,
        BlockType::Testimonials,
        BlockType::FaqSection,
        BlockType::ServiceAreaMap,
        BlockType::ContactForm,
    ];
    let blocks = lineup
        .iter()
        .filter(|&&b| templates::required_data_check(b, profile, &serde_json::Value::Null).is_none())
        .enumerate()
        .map(|(i, &block_type)| BlockSelection {
            block_type,
            visible: true,
            order: i as u32,
            content: serde_json::Value::Null,
        })
        .collect();
    ContentBlockSelection {
        website_id: website_id.to_string(),
        blocks,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
