//! Sample records for running the service without a real database

use crate::config::CollectionSettings;
use crate::models::{Donation, FoodRequest, GeoPoint, Ngo, Urgency, Volunteer};
use crate::services::memory::MemoryStore;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

const MUMBAI: GeoPoint = GeoPoint { lat: 19.0760, lng: 72.8777 };
const DELHI: GeoPoint = GeoPoint { lat: 28.6139, lng: 77.2090 };
const CHENNAI: GeoPoint = GeoPoint { lat: 13.0827, lng: 80.2707 };

pub fn sample_ngos() -> Vec<Ngo> {
    vec![
        Ngo {
            id: "1".into(),
            name: "Annapurna Food Bank".into(),
            address: "12 Marine Drive, Mumbai".into(),
            contact: "+91 22 4000 1001".into(),
            location: MUMBAI,
            capacity: 1000,
            current_stock: 750,
        },
        Ngo {
            id: "2".into(),
            name: "Roti Sharing Trust".into(),
            address: "48 Janpath, New Delhi".into(),
            contact: "+91 11 4000 2002".into(),
            location: DELHI,
            capacity: 800,
            current_stock: 600,
        },
        Ngo {
            id: "3".into(),
            name: "Coastal Meals Foundation".into(),
            address: "7 Elliot's Beach Road, Chennai".into(),
            contact: "+91 44 4000 3003".into(),
            location: CHENNAI,
            capacity: 1200,
            current_stock: 900,
        },
    ]
}

pub fn sample_donations() -> Vec<Donation> {
    let now = Utc::now();
    vec![
        Donation {
            id: "1".into(),
            item_name: "Rice".into(),
            quantity: "10kg".into(),
            description: "Sealed bags of basmati rice".into(),
            image_url: None,
            expiry_days: "30".into(),
            created_at: Some(now),
            status: "pending".into(),
            user_id: "donor-1".into(),
            user_name: "Priya Shah".into(),
            user_email: "priya@example.com".into(),
            location: Some(MUMBAI),
        },
        Donation {
            id: "2".into(),
            item_name: "Vegetables".into(),
            quantity: "5kg".into(),
            description: "Mixed seasonal vegetables".into(),
            image_url: None,
            expiry_days: "3".into(),
            created_at: Some(now),
            status: "pending".into(),
            user_id: "donor-2".into(),
            user_name: "Arjun Mehta".into(),
            user_email: "arjun@example.com".into(),
            location: Some(DELHI),
        },
    ]
}

pub fn sample_requests() -> Vec<FoodRequest> {
    let now = Utc::now();
    vec![
        FoodRequest {
            id: "1".into(),
            item_name: "Rice".into(),
            quantity: "5kg".into(),
            description: "Rice for a family of four".into(),
            urgency: Urgency::High,
            created_at: Some(now),
            status: "pending".into(),
            user_id: "recipient-1".into(),
            user_name: "Lakshmi Iyer".into(),
            user_email: "lakshmi@example.com".into(),
            location: Some(CHENNAI),
        },
        FoodRequest {
            id: "2".into(),
            item_name: "Vegetables".into(),
            quantity: "2kg".into(),
            description: "Vegetables for an elderly couple".into(),
            urgency: Urgency::Medium,
            created_at: Some(now),
            status: "pending".into(),
            user_id: "recipient-2".into(),
            user_name: "Rahul Verma".into(),
            user_email: "rahul@example.com".into(),
            location: Some(MUMBAI),
        },
    ]
}

pub fn sample_volunteers() -> Vec<Volunteer> {
    let now = Utc::now();
    vec![
        Volunteer {
            id: "1".into(),
            name: "Kabir Singh".into(),
            phone: "+91 98200 00001".into(),
            address: "21 Hill Road, Mumbai".into(),
            role: "delivery".into(),
            availability: "weekends".into(),
            vehicle_type: "car".into(),
            max_distance: "5".into(),
            created_at: Some(now),
            status: "active".into(),
            user_id: "volunteer-1".into(),
            user_email: "kabir@example.com".into(),
            location: Some(MUMBAI),
        },
        Volunteer {
            id: "2".into(),
            name: "Meera Nair".into(),
            phone: "+91 98100 00002".into(),
            address: "9 Lodhi Colony, New Delhi".into(),
            role: "storage".into(),
            availability: "weekdays".into(),
            vehicle_type: "van".into(),
            max_distance: "10".into(),
            created_at: Some(now),
            status: "active".into(),
            user_id: "volunteer-2".into(),
            user_email: "meera@example.com".into(),
            location: Some(DELHI),
        },
    ]
}

/// Fill a memory store with every sample collection
pub async fn seed(store: &MemoryStore, collections: &CollectionSettings) {
    put_all(store, &collections.ngos, sample_ngos(), |n| &n.id).await;
    put_all(store, &collections.donations, sample_donations(), |d| &d.id).await;
    put_all(store, &collections.requests, sample_requests(), |r| &r.id).await;
    put_all(store, &collections.volunteers, sample_volunteers(), |v| &v.id).await;

    tracing::info!("Seeded memory store with sample NGOs, donations, requests and volunteers");
}

async fn put_all<T, F>(store: &MemoryStore, collection: &str, records: Vec<T>, id_of: F)
where
    T: Serialize,
    F: Fn(&T) -> &String,
{
    for record in &records {
        if let Ok(Value::Object(doc)) = serde_json::to_value(record) {
            store.put(collection, id_of(record), doc).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::DocumentStore;

    #[tokio::test]
    async fn test_seed_fills_every_collection() {
        let store = MemoryStore::new();
        let collections = CollectionSettings::default();
        seed(&store, &collections).await;

        assert_eq!(store.count("ngos").await, 3);
        assert_eq!(store.count("donations").await, 2);
        assert_eq!(store.count("requests").await, 2);
        assert_eq!(store.count("volunteers").await, 2);

        let donation = store.get_by_id("donations", "1").await.unwrap().unwrap();
        assert_eq!(donation["itemName"], "Rice");
        assert_eq!(donation["id"], "1");
    }
}
