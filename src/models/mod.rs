// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Donation, FoodMatch, FoodRequest, GeoPoint, MatchSource, MatchStatus, Ngo, Urgency, Volunteer};
pub use requests::{
    ChatRequest, CreateDonationRequest, CreateFoodRequest, CreateVolunteerRequest, MatchFoodRequest,
    NearbyNgosQuery, UpdateStatusRequest,
};
pub use responses::{ChatResponse, ErrorResponse, HealthResponse, MessageResponse};
