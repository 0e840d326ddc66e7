use crate::error::ApiError;
use crate::routes::AppState;
use crate::services::RecordKind;
use actix_web::{web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/{kind}", web::get().to(list_records))
        .route("/{kind}/{id}", web::get().to(get_record));
}

fn parse_kind(raw: &str) -> Result<RecordKind, ApiError> {
    match raw.parse() {
        Ok(RecordKind::Matches) | Err(_) => Err(ApiError::NotFound(format!("No such collection: {}", raw))),
        Ok(kind) => Ok(kind),
    }
}

/// GET /dev/{ngos|donations|requests|volunteers}
async fn list_records(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let kind = parse_kind(&path)?;

    let records = state
        .repository
        .list_documents(kind)
        .await
        .map_err(|e| ApiError::internal("Failed to list records", &e, state.expose_error_details))?;

    Ok(HttpResponse::Ok().json(records))
}

/// GET /dev/{kind}/{id}
async fn get_record(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (kind, id) = path.into_inner();
    let kind = parse_kind(&kind)?;

    let record = state
        .repository
        .get_document(kind, &id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch record", &e, state.expose_error_details))?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", kind)))?;

    Ok(HttpResponse::Ok().json(record))
}
