use crate::core::{filter_nearby, NearbySearch};
use crate::error::ApiError;
use crate::models::NearbyNgosQuery;
use crate::routes::AppState;
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ngos/nearby", web::get().to(nearby_ngos));
}

/// NGOs within a radius of a point
///
/// GET /api/ngos/nearby?lat=19.07&lng=72.87&radius=5
///
/// `radius` is in kilometres and defaults to the configured radius. NGOs
/// exactly on the boundary are included.
async fn nearby_ngos(
    state: web::Data<AppState>,
    query: web::Query<NearbyNgosQuery>,
) -> Result<HttpResponse, ApiError> {
    let search = NearbySearch::from_params(
        query.lat.as_deref(),
        query.lng.as_deref(),
        query.radius.as_deref(),
        state.nearby_radius_km,
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let ngos = state.repository.list_ngos().await.map_err(|e| {
        ApiError::internal("Failed to fetch nearby NGOs", &e, state.expose_error_details)
    })?;

    let total = ngos.len();
    let nearby = filter_nearby(ngos, &search);

    tracing::info!(
        "Found {} of {} NGOs within {} km of ({}, {})",
        nearby.len(),
        total,
        search.radius_km,
        search.center.lat,
        search.center.lng
    );

    Ok(HttpResponse::Ok().json(nearby))
}
