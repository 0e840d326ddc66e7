use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{string_or_number, Donation, FoodRequest, GeoPoint, Urgency, Volunteer};

/// Query string for the nearby NGO lookup
///
/// Values stay textual here so that a missing coordinate and a malformed one
/// can be told apart when the search is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyNgosQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

/// Request to match a donation against pending requests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchFoodRequest {
    #[validate(length(min = 1, message = "Donation ID is required"))]
    #[serde(default, alias = "donation_id", rename = "donationId")]
    pub donation_id: String,
}

/// Status change for a donation, request, volunteer or match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub item_name: String,
    #[validate(length(min = 1, message = "Quantity is required"))]
    pub quantity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[validate(length(min = 1, message = "Expiry in days is required"))]
    #[serde(default, deserialize_with = "string_or_number")]
    pub expiry_days: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[validate(email)]
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl CreateDonationRequest {
    pub fn into_donation(self, created_at: DateTime<Utc>) -> Donation {
        Donation {
            id: String::new(),
            item_name: self.item_name,
            quantity: self.quantity,
            description: self.description,
            image_url: self.image_url,
            expiry_days: self.expiry_days,
            created_at: Some(created_at),
            status: "pending".to_string(),
            user_id: self.user_id,
            user_name: self.user_name,
            user_email: self.user_email.unwrap_or_default(),
            location: self.location,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub item_name: String,
    #[validate(length(min = 1, message = "Quantity is required"))]
    pub quantity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[validate(email)]
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl CreateFoodRequest {
    pub fn into_request(self, created_at: DateTime<Utc>) -> FoodRequest {
        FoodRequest {
            id: String::new(),
            item_name: self.item_name,
            quantity: self.quantity,
            description: self.description,
            urgency: self.urgency,
            created_at: Some(created_at),
            status: "pending".to_string(),
            user_id: self.user_id,
            user_name: self.user_name,
            user_email: self.user_email.unwrap_or_default(),
            location: self.location,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolunteerRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub max_distance: String,
    #[serde(default)]
    pub user_id: String,
    #[validate(email)]
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl CreateVolunteerRequest {
    pub fn into_volunteer(self, created_at: DateTime<Utc>) -> Volunteer {
        Volunteer {
            id: String::new(),
            name: self.name,
            phone: self.phone,
            address: self.address,
            role: self.role,
            availability: self.availability,
            vehicle_type: self.vehicle_type,
            max_distance: self.max_distance,
            created_at: Some(created_at),
            status: "active".to_string(),
            user_id: self.user_id,
            user_email: self.user_email.unwrap_or_default(),
            location: self.location,
        }
    }
}

/// Chatbot message
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Message is required"))]
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}
