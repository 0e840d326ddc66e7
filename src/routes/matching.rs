use crate::error::ApiError;
use crate::models::{MatchFoodRequest, MatchStatus, MessageResponse, UpdateStatusRequest};
use crate::routes::AppState;
use crate::services::RecordKind;
use actix_web::{web, HttpResponse};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/match-food", web::post().to(match_food))
        .route("/matches/{id}", web::patch().to(update_match_status));
}

/// Match a donation against every pending request
///
/// POST /api/match-food
///
/// Request body:
/// ```json
/// { "donationId": "string" }
/// ```
///
/// Responds with the stored matches. If any insert fails the request fails;
/// matches already written are kept.
async fn match_food(
    state: web::Data<AppState>,
    req: web::Json<MatchFoodRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match_food request: {:?}", errors);
        return Err(ApiError::validation(&errors));
    }

    let donation_id = req.donation_id.as_str();
    let expose = state.expose_error_details;

    let donation = state
        .repository
        .get_donation(donation_id)
        .await
        .map_err(|e| ApiError::internal("Failed to match food", &e, expose))?
        .ok_or_else(|| ApiError::NotFound("Donation not found".to_string()))?;

    let requests = state
        .repository
        .pending_requests()
        .await
        .map_err(|e| ApiError::internal("Failed to match food", &e, expose))?;

    tracing::debug!("Loaded {} pending requests for donation {}", requests.len(), donation_id);

    let matches = state
        .matcher
        .match_food(&donation, &requests)
        .await
        .map_err(|e| ApiError::internal("Failed to match food", &e, expose))?;

    let stored = state
        .repository
        .insert_matches(matches)
        .await
        .map_err(|e| ApiError::internal("Failed to match food", &e, expose))?;

    tracing::info!(
        "Created {} matches for donation {} (from {} pending requests)",
        stored.len(),
        donation_id,
        requests.len()
    );

    Ok(HttpResponse::Ok().json(stored))
}

/// PATCH /api/matches/{id}
///
/// Moves a match to `accepted`, `rejected`, `completed` or back to `pending`.
async fn update_match_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    if let Err(errors) = req.validate() {
        return Err(ApiError::validation(&errors));
    }

    let status: MatchStatus = req.status.parse().map_err(ApiError::BadRequest)?;

    let found = state
        .repository
        .update_status(RecordKind::Matches, &id, status.as_str())
        .await
        .map_err(|e| {
            ApiError::internal("Failed to update match status", &e, state.expose_error_details)
        })?;

    if !found {
        return Err(ApiError::NotFound("Match not found".to_string()));
    }

    tracing::info!("Match {} is now {}", id, status.as_str());

    Ok(HttpResponse::Ok().json(MessageResponse::new(format!(
        "Match status updated to {}",
        status.as_str()
    ))))
}
