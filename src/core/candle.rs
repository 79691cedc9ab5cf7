//! Candle records as delivered by the live sync feed
//!
//! A candle is one prayer intention dropped on the map. The backend keys
//! candles by an opaque document id; the record itself carries the fields
//! below.

use serde::{Deserialize, Serialize};

/// Sentinel category for candles that carry none.
pub const DEFAULT_CATEGORY: &str = "General";

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Who may see a candle on the public map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Shown with the author's intention text.
    Public,
    /// Shown without attribution.
    Anonymous,
    /// Never placed on the shared map.
    Private,
}

/// One candle record from the feed's keyed collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub intention: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Optional saint or intercessor the candle is entrusted to.
    #[serde(default)]
    pub saint: Option<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Creation time, epoch milliseconds.
    pub created_at: f64,
    /// Expiry time, epoch milliseconds.
    pub expires_at: f64,
    #[serde(default)]
    pub prayer_count: u32,
}

/// Marker accent derived from a candle's age and remaining lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleStatus {
    /// Lit less than an hour ago.
    New,
    Steady,
    /// Less than 24h of burn time left.
    Expiring,
}

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

impl Candle {
    /// Category label, falling back to the sentinel.
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Whether this candle belongs on the shared map: visible to others
    /// and carrying a location. Mirrors the feed-side query filter.
    pub fn is_mappable(&self) -> bool {
        self.visibility != Visibility::Private && self.location.is_some()
    }

    pub fn status(&self, now_ms: f64) -> CandleStatus {
        if self.expires_at - now_ms < 24.0 * HOUR_MS {
            CandleStatus::Expiring
        } else if now_ms - self.created_at < HOUR_MS {
            CandleStatus::New
        } else {
            CandleStatus::Steady
        }
    }

    /// Relative age for popups: "just now", "N minutes ago", ...
    pub fn age_label(&self, now_ms: f64) -> String {
        let seconds = ((now_ms - self.created_at) / 1000.0).max(0.0) as u64;
        match seconds {
            0..=59 => "just now".to_string(),
            60..=3599 => format!("{} minutes ago", seconds / 60),
            3600..=86399 => format!("{} hours ago", seconds / 3600),
            _ => format!("{} days ago", seconds / 86400),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(visibility: Visibility, location: Option<GeoPoint>) -> Candle {
        Candle {
            intention: "peace at home".into(),
            category: None,
            saint: None,
            visibility,
            location,
            created_at: 0.0,
            expires_at: 7.0 * 24.0 * HOUR_MS,
            prayer_count: 0,
        }
    }

    #[test]
    fn test_mappable_filter() {
        let loc = Some(GeoPoint { lat: 41.9, lng: 12.5 });
        assert!(candle(Visibility::Public, loc).is_mappable());
        assert!(candle(Visibility::Anonymous, loc).is_mappable());
        assert!(!candle(Visibility::Private, loc).is_mappable());
        assert!(!candle(Visibility::Public, None).is_mappable());
    }

    #[test]
    fn test_category_fallback() {
        let mut c = candle(Visibility::Public, None);
        assert_eq!(c.category_or_default(), DEFAULT_CATEGORY);
        c.category = Some("health".into());
        assert_eq!(c.category_or_default(), "health");
    }

    #[test]
    fn test_status_transitions() {
        let c = candle(Visibility::Public, None);
        // Fresh candle with a week left
        assert_eq!(c.status(10.0 * 60.0 * 1000.0), CandleStatus::New);
        // Two hours in, still most of a week left
        assert_eq!(c.status(2.0 * HOUR_MS), CandleStatus::Steady);
        // Less than a day of burn time remaining
        assert_eq!(c.status(c.expires_at - 3.0 * HOUR_MS), CandleStatus::Expiring);
    }

    #[test]
    fn test_age_label() {
        let c = candle(Visibility::Public, None);
        assert_eq!(c.age_label(30.0 * 1000.0), "just now");
        assert_eq!(c.age_label(5.0 * 60.0 * 1000.0), "5 minutes ago");
        assert_eq!(c.age_label(3.0 * HOUR_MS), "3 hours ago");
        assert_eq!(c.age_label(50.0 * HOUR_MS), "2 days ago");
    }

    #[test]
    fn test_deserialize_feed_record() {
        let json = r#"{
            "intention": "for my grandmother",
            "category": "health",
            "saint": "St. Raphael",
            "visibility": "public",
            "location": {"lat": -23.55, "lng": -46.63},
            "createdAt": 1700000000000.0,
            "expiresAt": 1700604800000.0,
            "prayerCount": 12
        }"#;
        let c: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(c.category_or_default(), "health");
        assert_eq!(c.prayer_count, 12);
        assert!(c.is_mappable());
    }
}
