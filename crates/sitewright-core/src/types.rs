use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trade {
    Hvac,
    Plumbing,
    Electrical,
    Roofing,
    Landscaping,
    GeneralContractor,
}

impl Trade {
    /// Human-facing label used in generated page copy.
    pub fn label(self) -> &'static str {
        match self {
            Trade::Hvac => "HVAC",
            Trade::Plumbing => "Plumbing",
            Trade::Electrical => "Electrical",
            Trade::Roofing => "Roofing",
            Trade::Landscaping => "Landscaping",
            Trade::GeneralContractor => "General Contractor",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trade::Hvac => "hvac",
            Trade::Plumbing => "plumbing",
            Trade::Electrical => "electrical",
            Trade::Roofing => "roofing",
            Trade::Landscaping => "landscaping",
            Trade::GeneralContractor => "general_contractor",
        }
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PricingModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    Fixed,
    Hourly,
    Quote,
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PricingModel::Fixed => "fixed",
            PricingModel::Hourly => "hourly",
            PricingModel::Quote => "quote",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// BlockType
// ---------------------------------------------------------------------------

/// Closed registry of content-block variants. Every variant has a render
/// function in `templates` and a declared set of required profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Hero,
    EmergencyBanner,
    ServicesGrid,
    BookingWidget,
    Testimonials,
    FaqSection,
    ContactForm,
    ServiceAreaMap,
}

impl BlockType {
    pub fn all() -> &'static [BlockType] {
        &[
            BlockType::Hero,
            BlockType::EmergencyBanner,
            BlockType::ServicesGrid,
            BlockType::BookingWidget,
            BlockType::Testimonials,
            BlockType::FaqSection,
            BlockType::ContactForm,
            BlockType::ServiceAreaMap,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Hero => "hero",
            BlockType::EmergencyBanner => "emergency_banner",
            BlockType::ServicesGrid => "services_grid",
            BlockType::BookingWidget => "booking_widget",
            BlockType::Testimonials => "testimonials",
            BlockType::FaqSection => "faq_section",
            BlockType::ContactForm => "contact_form",
            BlockType::ServiceAreaMap => "service_area_map",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BlockType {
    type Err = crate::error::SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hero" => Ok(BlockType::Hero),
            "emergency_banner" => Ok(BlockType::EmergencyBanner),
            "services_grid" => Ok(BlockType::ServicesGrid),
            "booking_widget" => Ok(BlockType::BookingWidget),
            "testimonials" => Ok(BlockType::Testimonials),
            "faq_section" => Ok(BlockType::FaqSection),
            "contact_form" => Ok(BlockType::ContactForm),
            "service_area_map" => Ok(BlockType::ServiceAreaMap),
            _ => Err(crate::error::SiteError::UnknownBlockType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationMethod
// ---------------------------------------------------------------------------

/// Which path produced a page's copy. The composer records this; it never
/// calls out to generative services itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    Template,
    Llm,
    Fallback,
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationMethod::Template => "template",
            GenerationMethod::Llm => "llm",
            GenerationMethod::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// DeployState
// ---------------------------------------------------------------------------

/// Deployment lifecycle states.
///
/// ```text
/// Queued -> Building -> Publishing -> Activating -> HealthChecking -> Live
/// any non-terminal -> Failed
/// HealthChecking -> Activating   (bounded re-activation retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    Queued,
    Building,
    Publishing,
    Activating,
    HealthChecking,
    Live,
    Failed,
}

impl DeployState {
    pub fn all() -> &'static [DeployState] {
        &[
            DeployState::Queued,
            DeployState::Building,
            DeployState::Publishing,
            DeployState::Activating,
            DeployState::HealthChecking,
            DeployState::Live,
            DeployState::Failed,
        ]
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeployState::Live | DeployState::Failed)
    }

    /// Legal edge set of the state machine. The registry rejects any
    /// transition this returns false for.
    pub fn can_transition_to(self, target: DeployState) -> bool {
        use DeployState::*;
        match (self, target) {
            (Queued, Building) => true,
            (Building, Publishing) => true,
            (Publishing, Activating) => true,
            (Activating, HealthChecking) => true,
            (HealthChecking, Live) => true,
            // Bounded health-check retry re-enters activation.
            (HealthChecking, Activating) => true,
            // Any non-terminal state may fail.
            (s, Failed) if !s.is_terminal() => true,
            _ => false,
        }
    }

    /// Maximum dwell time in a non-terminal state before the orchestrator
    /// forces a timeout failure. `None` for terminal states.
    pub fn max_dwell(self) -> Option<Duration> {
        match self {
            DeployState::Queued => Some(Duration::from_secs(60)),
            DeployState::Building => Some(Duration::from_secs(300)),
            DeployState::Publishing => Some(Duration::from_secs(600)),
            DeployState::Activating => Some(Duration::from_secs(120)),
            DeployState::HealthChecking => Some(Duration::from_secs(300)),
            DeployState::Live | DeployState::Failed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeployState::Queued => "queued",
            DeployState::Building => "building",
            DeployState::Publishing => "publishing",
            DeployState::Activating => "activating",
            DeployState::HealthChecking => "health_checking",
            DeployState::Live => "live",
            DeployState::Failed => "failed",
        }
    }
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeployState {
    type Err = crate::error::SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(DeployState::Queued),
            "building" => Ok(DeployState::Building),
            "publishing" => Ok(DeployState::Publishing),
            "activating" => Ok(DeployState::Activating),
            "health_checking" => Ok(DeployState::HealthChecking),
            "live" => Ok(DeployState::Live),
            "failed" => Ok(DeployState::Failed),
            _ => Err(crate::error::SiteError::Validation(format!(
                "invalid deploy state: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
