// Integration tests for Zero Hunger: drive the HTTP app end to end against
// the in-memory store and a scripted completion model

use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use zero_hunger::config::CollectionSettings;
use zero_hunger::core::FoodMatcher;
use zero_hunger::error::{json_error_handler, query_error_handler};
use zero_hunger::routes::{self, AppState};
use zero_hunger::services::{
    fixtures, CompletionError, ConversationStore, Document, DocumentStore, FoodRepository,
    MemoryStore, StoreError, TextCompletion,
};

/// Completion stub that answers every prompt with the same reply
struct ScriptedModel {
    reply: Result<Option<String>, u16>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(Some(text.to_string())),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn silent() -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(None),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompletion for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(CompletionError::ApiError {
                status: *status,
                message: "model unavailable".to_string(),
            }),
        }
    }
}

/// Memory store whose inserts into `matches` fail after `allowed` successes
struct FlakyStore {
    inner: MemoryStore,
    allowed: Mutex<usize>,
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get_by_id(collection, id).await
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.query_by_field(collection, field, value).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection).await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        if collection == "matches" {
            let mut allowed = self.allowed.lock().unwrap();
            if *allowed == 0 {
                return Err(StoreError::ApiError("write quota exceeded".to_string()));
            }
            *allowed -= 1;
        }
        self.inner.insert(collection, document).await
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError> {
        self.inner.update_fields(collection, id, fields).await
    }
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    fixtures::seed(&store, &CollectionSettings::default()).await;
    Arc::new(store)
}

fn state(store: Arc<dyn DocumentStore>, model: Arc<ScriptedModel>) -> AppState {
    AppState {
        repository: Arc::new(FoodRepository::new(store, CollectionSettings::default())),
        matcher: Arc::new(FoodMatcher::new(model.clone())),
        assistant: model,
        conversations: Arc::new(ConversationStore::new(100, 60)),
        nearby_radius_km: 5.0,
        expose_error_details: true,
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .configure(routes::configure_routes)
                .configure(routes::configure_dev_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_and_welcome() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_nearby_requires_coordinates() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    for uri in ["/api/ngos/nearby", "/api/ngos/nearby?lat=19.07", "/api/ngos/nearby?lng=72.87"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), 400, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Latitude and longitude are required");
    }
}

#[actix_web::test]
async fn test_nearby_unparsable_values_return_empty_list() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    for uri in [
        "/api/ngos/nearby?lat=north&lng=72.8777",
        "/api/ngos/nearby?lat=19.0760&lng=east",
        "/api/ngos/nearby?lat=19.0760&lng=72.8777&radius=far",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success(), "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([]), "{}", uri);
    }
}

#[actix_web::test]
async fn test_nearby_blank_radius_is_zero() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    // Exactly on the Mumbai NGO: a zero radius still includes it
    let req = test::TestRequest::get()
        .uri("/api/ngos/nearby?lat=19.0760&lng=72.8777&radius=")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|n| n["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1"]);

    // A few hundred metres away: the default 5 km would match, zero does not
    let req = test::TestRequest::get()
        .uri("/api/ngos/nearby?lat=19.0800&lng=72.8800&radius=")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn test_nearby_uses_default_radius() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    // Mumbai: only the Mumbai NGO is within 5 km
    let req = test::TestRequest::get()
        .uri("/api/ngos/nearby?lat=19.0760&lng=72.8777")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ngos = body.as_array().unwrap();
    assert_eq!(ngos.len(), 1);
    assert_eq!(ngos[0]["id"], "1");
    assert_eq!(ngos[0]["location"]["lat"], 19.0760);
}

#[actix_web::test]
async fn test_nearby_wide_radius_keeps_store_order() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    let req = test::TestRequest::get()
        .uri("/api/ngos/nearby?lat=19.0760&lng=72.8777&radius=2000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[actix_web::test]
async fn test_match_food_requires_donation_id() {
    let model = ScriptedModel::replying("[]");
    let app = init_app!(state(seeded_store().await, model.clone()));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Donation ID is required");
    assert!(model.prompts().is_empty());
}

#[actix_web::test]
async fn test_match_food_unknown_donation() {
    let model = ScriptedModel::replying("[]");
    let app = init_app!(state(seeded_store().await, model.clone()));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "does-not-exist" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Donation not found");
    assert!(model.prompts().is_empty());
}

#[actix_web::test]
async fn test_match_food_persists_model_matches() {
    let store = seeded_store().await;
    let model = ScriptedModel::replying(r#"[{"requestId":"1","score":0.9,"reason":"Both are rice"}]"#);
    let app = init_app!(state(store.clone(), model.clone()));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    let matches = body.as_array().unwrap();
    assert_eq!(matches.len(), 1);

    let m = &matches[0];
    assert_eq!(m["donationId"], "1");
    assert_eq!(m["requestId"], "1");
    assert_eq!(m["score"], 0.9);
    assert_eq!(m["status"], "pending");
    assert_eq!(m["matchedBy"], "ai");
    assert_eq!(m["distance"], 0.0);
    assert!(m.get("ngoId").is_none());
    assert!(!m["id"].as_str().unwrap().is_empty());

    assert_eq!(store.count("matches").await, 1);

    // Both pending requests were offered to the model
    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Request ID: 1"));
    assert!(prompts[0].contains("Request ID: 2"));
    assert!(prompts[0].contains("- Item: Rice"));
}

#[actix_web::test]
async fn test_match_food_skips_fulfilled_requests() {
    let store = seeded_store().await;
    let model = ScriptedModel::replying("[]");
    let app = init_app!(state(store.clone(), model.clone()));

    let req = test::TestRequest::patch()
        .uri("/api/requests/2")
        .set_json(json!({ "status": "fulfilled" }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));

    let prompts = model.prompts();
    assert!(prompts[0].contains("Request ID: 1"));
    assert!(!prompts[0].contains("Request ID: 2"));
    assert_eq!(store.count("matches").await, 0);
}

#[actix_web::test]
async fn test_match_food_offers_every_pending_request() {
    let store = seeded_store().await;
    store
        .put("requests", "r-num", json!({ "itemName": "Dal", "quantity": 5, "status": "pending" }).as_object().cloned().unwrap())
        .await;
    store
        .put("requests", "r-caps", json!({ "itemName": "Milk", "quantity": "2l", "urgency": "High", "status": "pending" }).as_object().cloned().unwrap())
        .await;
    let model = ScriptedModel::replying("[]");
    let app = init_app!(state(store.clone(), model.clone()));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "1" }))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let prompt = &model.prompts()[0];
    for id in ["1", "2", "r-num", "r-caps"] {
        assert!(prompt.contains(&format!("Request ID: {}\n", id)), "missing {}", id);
    }
    assert!(prompt.contains("Quantity: 5\n"));
    assert!(prompt.contains("Urgency: high"));
}

#[actix_web::test]
async fn test_match_food_undecodable_pending_request_is_500() {
    let store = seeded_store().await;
    store
        .put("requests", "r-bad", json!({ "itemName": "Dal", "location": "Chennai", "status": "pending" }).as_object().cloned().unwrap())
        .await;
    let model = ScriptedModel::replying("[]");
    let app = init_app!(state(store.clone(), model.clone()));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    assert!(model.prompts().is_empty());
}

#[actix_web::test]
async fn test_match_food_model_failure_is_500() {
    let store = seeded_store().await;
    let app = init_app!(state(store.clone(), ScriptedModel::failing(503)));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Failed to match food");
    assert!(body["details"].as_str().unwrap().contains("model unavailable"));
    assert_eq!(store.count("matches").await, 0);
}

#[actix_web::test]
async fn test_match_food_empty_or_garbled_reply_is_500() {
    for model in [ScriptedModel::silent(), ScriptedModel::replying("Sure! Request 1 looks good.")] {
        let store = seeded_store().await;
        let app = init_app!(state(store.clone(), model));

        let req = test::TestRequest::post()
            .uri("/api/match-food")
            .set_json(json!({ "donationId": "1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 500);
        assert_eq!(store.count("matches").await, 0);
    }
}

#[actix_web::test]
async fn test_match_food_persist_failure_is_500() {
    let inner = MemoryStore::new();
    fixtures::seed(&inner, &CollectionSettings::default()).await;
    let store = Arc::new(FlakyStore {
        inner,
        allowed: Mutex::new(1),
    });
    let model = ScriptedModel::replying(
        r#"[{"requestId":"1","score":0.9},{"requestId":"2","score":0.4}]"#,
    );
    let app = init_app!(state(store.clone(), model));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    // No rollback: the write that succeeded stays
    assert_eq!(store.inner.count("matches").await, 1);
}

#[actix_web::test]
async fn test_update_match_status() {
    let model = ScriptedModel::replying(r#"[{"requestId":"2","score":0.5}]"#);
    let app = init_app!(state(seeded_store().await, model));

    let req = test::TestRequest::post()
        .uri("/api/match-food")
        .set_json(json!({ "donationId": "2" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let id = body[0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/matches/{}", id))
        .set_json(json!({ "status": "Accepted" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri(&format!("/dev/matches/{}", id))
        .to_request();
    // Matches are not browsable through the dev routes
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/matches/{}", id))
        .set_json(json!({ "status": "maybe" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::patch()
        .uri("/api/matches/unknown")
        .set_json(json!({ "status": "rejected" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_create_donation() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    let req = test::TestRequest::post()
        .uri("/api/donations")
        .set_json(json!({
            "itemName": "Bread",
            "quantity": "20 loaves",
            "expiryDays": 2,
            "userName": "Asha",
            "location": { "lat": 19.08, "lng": 72.88 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["expiryDays"], "2");
    assert!(body["createdAt"].is_string());
    let id = body["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/dev/donations/{}", id))
        .to_request();
    let stored: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stored["itemName"], "Bread");
}

#[actix_web::test]
async fn test_create_listing_validation() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    // Out-of-range location
    let req = test::TestRequest::post()
        .uri("/api/requests")
        .set_json(json!({
            "itemName": "Milk",
            "quantity": "2 litres",
            "location": { "lat": 123.0, "lng": 0.0 }
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    // Empty required field
    let req = test::TestRequest::post()
        .uri("/api/volunteers")
        .set_json(json!({ "name": "", "phone": "123" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    // Malformed JSON goes through the payload error handler
    let req = test::TestRequest::post()
        .uri("/api/donations")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "bad_request");
}

#[actix_web::test]
async fn test_update_listing_status_not_found() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    let req = test::TestRequest::patch()
        .uri("/api/volunteers/404")
        .set_json(json!({ "status": "inactive" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Volunteer not found");
}

#[actix_web::test]
async fn test_chat_greets_once_per_session() {
    let model = ScriptedModel::replying("  Happy to help!  ");
    let app = init_app!(state(seeded_store().await, model.clone()));

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/chatbot/chat")
            .set_json(json!({ "message": "Where can I donate rice?", "sessionId": "s-1" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["response"], "Happy to help!");
    }

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("first message"));
    assert!(!prompts[1].contains("first message"));
    assert!(prompts[1].ends_with("User: Where can I donate rice?\nAssistant:"));
}

#[actix_web::test]
async fn test_chat_errors() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    let req = test::TestRequest::post()
        .uri("/api/chatbot/chat")
        .set_json(json!({ "sessionId": "s-1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/chatbot/chat")
        .set_json(json!({ "message": "hello" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 500);
}

#[actix_web::test]
async fn test_dev_routes() {
    let app = init_app!(state(seeded_store().await, ScriptedModel::silent()));

    let req = test::TestRequest::get().uri("/dev/ngos").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let req = test::TestRequest::get().uri("/dev/volunteers/2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "Meera Nair");

    let req = test::TestRequest::get().uri("/dev/donations/42").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::get().uri("/dev/pantries").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}
