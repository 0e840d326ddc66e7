//! Zero Hunger - food donation matching service
//!
//! Connects food donations with pending food requests using a generative
//! model, and helps people find NGOs close to them.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{filter_nearby, haversine_distance, FoodMatcher, NearbySearch};
pub use error::ApiError;
pub use models::{Donation, FoodMatch, FoodRequest, GeoPoint, Ngo};
