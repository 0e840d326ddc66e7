use crate::error::ApiError;
use crate::models::{
    CreateDonationRequest, CreateFoodRequest, CreateVolunteerRequest, GeoPoint, MessageResponse,
    UpdateStatusRequest,
};
use crate::routes::AppState;
use crate::services::RecordKind;
use actix_web::{web, HttpResponse};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/donations", web::post().to(create_donation))
        .route("/donations/{id}", web::patch().to(update_donation_status))
        .route("/requests", web::post().to(create_request))
        .route("/requests/{id}", web::patch().to(update_request_status))
        .route("/volunteers", web::post().to(create_volunteer))
        .route("/volunteers/{id}", web::patch().to(update_volunteer_status));
}

fn check_location(location: Option<&GeoPoint>) -> Result<(), ApiError> {
    match location {
        Some(point) if !point.is_valid() => Err(ApiError::BadRequest(format!(
            "Location ({}, {}) is out of range",
            point.lat, point.lng
        ))),
        _ => Ok(()),
    }
}

/// POST /api/donations
async fn create_donation(
    state: web::Data<AppState>,
    req: web::Json<CreateDonationRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::validation(&e))?;
    check_location(req.location.as_ref())?;

    let mut donation = req.into_inner().into_donation(chrono::Utc::now());
    donation.id = state
        .repository
        .create(RecordKind::Donations, &donation)
        .await
        .map_err(|e| ApiError::internal("Failed to create donation", &e, state.expose_error_details))?;

    tracing::info!("Donation {} created: {} ({})", donation.id, donation.item_name, donation.quantity);

    Ok(HttpResponse::Created().json(donation))
}

/// POST /api/requests
async fn create_request(
    state: web::Data<AppState>,
    req: web::Json<CreateFoodRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::validation(&e))?;
    check_location(req.location.as_ref())?;

    let mut request = req.into_inner().into_request(chrono::Utc::now());
    request.id = state
        .repository
        .create(RecordKind::Requests, &request)
        .await
        .map_err(|e| ApiError::internal("Failed to create request", &e, state.expose_error_details))?;

    tracing::info!("Request {} created: {} ({} urgency)", request.id, request.item_name, request.urgency);

    Ok(HttpResponse::Created().json(request))
}

/// POST /api/volunteers
async fn create_volunteer(
    state: web::Data<AppState>,
    req: web::Json<CreateVolunteerRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::validation(&e))?;
    check_location(req.location.as_ref())?;

    let mut volunteer = req.into_inner().into_volunteer(chrono::Utc::now());
    volunteer.id = state
        .repository
        .create(RecordKind::Volunteers, &volunteer)
        .await
        .map_err(|e| ApiError::internal("Failed to register volunteer", &e, state.expose_error_details))?;

    tracing::info!("Volunteer {} registered", volunteer.id);

    Ok(HttpResponse::Created().json(volunteer))
}

async fn update_donation_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    update_status(&state, RecordKind::Donations, &path, &req).await
}

async fn update_request_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    update_status(&state, RecordKind::Requests, &path, &req).await
}

async fn update_volunteer_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    update_status(&state, RecordKind::Volunteers, &path, &req).await
}

/// Listing statuses are free-form; only presence is checked
async fn update_status(
    state: &AppState,
    kind: RecordKind,
    id: &str,
    req: &UpdateStatusRequest,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(|e| ApiError::validation(&e))?;
    let status = req.status.trim();

    let found = state
        .repository
        .update_status(kind, id, status)
        .await
        .map_err(|e| {
            ApiError::internal(
                format!("Failed to update {} status", kind.singular().to_lowercase()),
                &e,
                state.expose_error_details,
            )
        })?;

    if !found {
        return Err(ApiError::NotFound(format!("{} not found", kind)));
    }

    tracing::info!("{} {} is now {}", kind, id, status);

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("{} status updated to {}", kind, status))))
}
