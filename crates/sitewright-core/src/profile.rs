use crate::error::{Result, SiteError};
use crate::types::{PricingModel, Trade};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Nested profile models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    pub postal_code: String,
    pub city: String,
    pub region: String,
    pub country_code: String,
    #[serde(default)]
    pub emergency_services_available: bool,
    #[serde(default = "default_true")]
    pub regular_services_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pricing_model: PricingModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHours {
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    pub open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<String>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// BusinessProfile
// ---------------------------------------------------------------------------

/// Point-in-time snapshot of a business, fetched once per composition or
/// deploy cycle. The pipeline never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade: Option<Trade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub service_areas: Vec<ServiceArea>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub hours: Vec<BusinessHours>,
}

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9\-\.\s\(\)]{6,19}$").unwrap())
}

static TIME_RE: OnceLock<Regex> = OnceLock::new();

fn time_re() -> &'static Regex {
    TIME_RE.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap())
}

impl BusinessProfile {
    /// Minimal-completeness check applied before any deployment side effect:
    /// at least one service area, well-formed hour entries, and a plausible
    /// phone number when one is present.
    pub fn validate_for_deploy(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SiteError::Validation("business name is empty".into()));
        }
        if self.service_areas.is_empty() {
            return Err(SiteError::Validation(
                "at least one service area is required".into(),
            ));
        }
        for area in &self.service_areas {
            if area.postal_code.trim().is_empty() || area.city.trim().is_empty() {
                return Err(SiteError::Validation(format!(
                    "service area '{}/{}' is missing postal code or city",
                    area.postal_code, area.city
                )));
            }
        }
        for h in &self.hours {
            if h.day_of_week > 6 {
                return Err(SiteError::Validation(format!(
                    "hours entry has day_of_week {} (expected 0-6)",
                    h.day_of_week
                )));
            }
            if h.open {
                let (open, close) = match (&h.open_time, &h.close_time) {
                    (Some(o), Some(c)) => (o, c),
                    _ => {
                        return Err(SiteError::Validation(format!(
                            "open hours entry for day {} is missing open/close times",
                            h.day_of_week
                        )))
                    }
                };
                if !time_re().is_match(open) || !time_re().is_match(close) {
                    return Err(SiteError::Validation(format!(
                        "hours entry for day {} has malformed times '{open}'-'{close}'",
                        h.day_of_week
                    )));
                }
                // HH:MM strings compare correctly lexicographically.
                if open >= close {
                    return Err(SiteError::Validation(format!(
                        "hours entry for day {} closes before it opens",
                        h.day_of_week
                    )));
                }
            }
        }
        if let Some(phone) = &self.phone {
            if !phone.trim().is_empty() && !phone_re().is_match(phone.trim()) {
                return Err(SiteError::Validation(format!(
                    "phone number '{phone}' is malformed"
                )));
            }
        }
        Ok(())
    }

    /// The primary location, falling back to the first service area's city.
    pub fn primary_location(&self) -> Option<String> {
        if let Some(loc) = self.locations.iter().find(|l| l.primary) {
            return Some(format!("{}, {}", loc.city, loc.state));
        }
        if let Some(loc) = self.locations.first() {
            return Some(format!("{}, {}", loc.city, loc.state));
        }
        self.service_areas
            .first()
            .map(|a| format!("{}, {}", a.city, a.region))
    }

    pub fn trade_label(&self) -> &'static str {
        self.trade.map(Trade::label).unwrap_or("Home Services")
    }

    /// True if any service area advertises emergency availability.
    pub fn emergency_available(&self) -> bool {
        self.service_areas
            .iter()
            .any(|a| a.emergency_services_available)
    }

    /// Hours entries that are open, ordered by day of week.
    pub fn open_hours(&self) -> Vec<&BusinessHours> {
        let mut open: Vec<&BusinessHours> = self.hours.iter().filter(|h| h.open).collect();
        open.sort_by_key(|h| h.day_of_week);
        open
    }
}

pub fn day_name(day: u8) -> &'static str {
    match day {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

/// schema.org two-letter day token for openingHoursSpecification.
pub fn day_schema_token(day: u8) -> &'static str {
    match day {
        0 => "Su",
        1 => "Mo",
        2 => "Tu",
        3 => "We",
        4 => "Th",
        5 => "Fr",
        6 => "Sa",
        _ => "",
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::fixtures::austin_hvac;
    use super::*;

    #[test]
    fn valid_profile_passes() {
        austin_hvac().validate_for_deploy().unwrap();
    }

    #[test]
    fn missing_service_areas_rejected() {
        let mut profile = austin_hvac();
        profile.service_areas.clear();
        let err = profile.validate_for_deploy().unwrap_err();
        assert!(err.is_validation(), "expected validation error, got {err}");
    }

    #[test]
    fn bad_day_of_week_rejected() {
        let mut profile = austin_hvac();
        profile.hours.push(BusinessHours {
            day_of_week: 7,
            open: false,
            open_time: None,
            close_time: None,
        });
        assert!(profile.validate_for_deploy().is_err());
    }

    #[test]
    fn malformed_time_rejected() {
        let mut profile = austin_hvac();
        profile.hours[0].open_time = Some("8am".into());
        assert!(profile.validate_for_deploy().is_err());
    }

    #[test]
    fn close_before_open_rejected() {
        let mut profile = austin_hvac();
        profile.hours[0].open_time = Some("18:00".into());
        profile.hours[0].close_time = Some("08:00".into());
        assert!(profile.validate_for_deploy().is_err());
    }

    #[test]
    fn closed_day_needs_no_times() {
        let mut profile = austin_hvac();
        profile.hours.push(BusinessHours {
            day_of_week: 0,
            open: false,
            open_time: None,
            close_time: None,
        });
        profile.validate_for_deploy().unwrap();
    }

    #[test]
    fn malformed_phone_rejected() {
        let mut profile = austin_hvac();
        profile.phone = Some("call me".into());
        assert!(profile.validate_for_deploy().is_err());
    }

    #[test]
    fn primary_location_prefers_primary_flag() {
        let mut profile = austin_hvac();
        profile.locations.push(Location {
            city: "Round Rock".into(),
            state: "TX".into(),
            primary: false,
        });
        assert_eq!(profile.primary_location().as_deref(), Some("Austin, TX"));
    }

    #[test]
    fn primary_location_falls_back_to_service_area() {
        let mut profile = austin_hvac();
        profile.locations.clear();
        assert_eq!(profile.primary_location().as_deref(), Some("Austin, TX"));
    }

    #[test]
    fn emergency_flag_derived_from_areas() {
        let mut profile = austin_hvac();
        assert!(profile.emergency_available());
        profile.service_areas[0].emergency_services_available = false;
        assert!(!profile.emergency_available());
    }
}
