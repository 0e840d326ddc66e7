// Route exports
pub mod chatbot;
pub mod dev;
pub mod listings;
pub mod matching;
pub mod ngos;

use crate::core::FoodMatcher;
use crate::models::{HealthResponse, MessageResponse};
use crate::services::{ConversationStore, FoodRepository, TextCompletion};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<FoodRepository>,
    pub matcher: Arc<FoodMatcher>,
    /// Free-text model used by the chatbot
    pub assistant: Arc<dyn TextCompletion>,
    pub conversations: Arc<ConversationStore>,
    pub nearby_radius_km: f64,
    /// Echo underlying error text in 500 responses
    pub expose_error_details: bool,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(welcome))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api")
                .configure(ngos::configure)
                .configure(matching::configure)
                .configure(listings::configure)
                .configure(chatbot::configure),
        );
}

/// Fixture browsing routes, only mounted in development
pub fn configure_dev_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/dev").configure(dev::configure));
}

async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse::new("Welcome to the Zero Hunger API"))
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}
