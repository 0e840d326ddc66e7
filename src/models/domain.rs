use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic point in degrees
///
/// Latitude is expected in [-90, 90] and longitude in [-180, 180]. Distance
/// calculations do not enforce this; use [`GeoPoint::is_valid`] at the edges
/// where input enters the system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Surplus food offered by a donor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_name: String,
    /// Free text with unit ("10kg"); bare numbers are kept as text
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Expiry horizon in days, kept as entered ("30", "2-3")
    #[serde(default, deserialize_with = "string_or_number")]
    pub expiry_days: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_pending")]
    pub status: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Food needed by a recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_name: String,
    /// Free text with unit ("10kg"); bare numbers are kept as text
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub description: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_pending")]
    pub status: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// How soon a request needs food
///
/// Read case-insensitively; anything unrecognised is treated as medium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = string_or_number(deserializer)?;
        Ok(match raw.trim().to_lowercase().as_str() {
            "low" => Urgency::Low,
            "high" => Urgency::High,
            _ => Urgency::Medium,
        })
    }
}

/// Person or organisation offering delivery or storage help
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub vehicle_type: String,
    /// Maximum travel distance in km, kept as entered
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_distance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub status: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Collection point run by a partner NGO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ngo {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub current_stock: u32,
}

/// Pairing of one donation with one request
///
/// Only produced by the matcher. `distance` stays at 0 until a later step
/// computes it; `id` is assigned by the store on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub donation_id: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ngo_id: Option<String>,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub matched_by: MatchSource,
    pub distance: f64,
    pub score: f64,
}

impl FoodMatch {
    /// New AI-suggested match awaiting confirmation
    pub fn suggested(
        donation_id: String,
        request_id: String,
        score: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            donation_id,
            request_id,
            ngo_id: None,
            status: MatchStatus::Pending,
            created_at,
            matched_by: MatchSource::Ai,
            distance: 0.0,
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
            MatchStatus::Completed => "completed",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(MatchStatus::Pending),
            "accepted" => Ok(MatchStatus::Accepted),
            "rejected" => Ok(MatchStatus::Rejected),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(format!(
                "unknown match status {:?}; expected one of: pending, accepted, rejected, completed",
                other
            )),
        }
    }
}

/// Who produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Ai,
}

fn default_pending() -> String {
    "pending".to_string()
}

fn default_active() -> String {
    "active".to_string()
}

/// Accept a JSON string, number or boolean and keep its text form
///
/// `null` reads as an empty string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Number(number)) => number.to_string(),
        Some(Raw::Flag(flag)) => flag.to_string(),
        None => String::new(),
    })
}
