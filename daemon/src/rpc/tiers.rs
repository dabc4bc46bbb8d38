// Tier catalog HTTP endpoints

use super::error::ApiError;
use crate::core::{storage::CatalogStore, CatalogService};
use actix_web::{
    http::header::{self, EntityTag, ETag},
    web::{self, Data, Json, Path, Query},
    HttpRequest, HttpResponse,
};
use fature_common::{
    api::{HealthResponse, ResolveParams},
    config::VERSION,
    tier::{CatalogEdit, CatalogSnapshot, Category, LevelForm},
};
use log::debug;

/// Register the tier routes. The application must provide
/// `Data<CatalogService<S>>`.
pub fn configure<S: CatalogStore>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| ApiError::BadRequest(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::<S>))
    .route("/tiers", web::get().to(get_tiers::<S>))
    .route("/tiers", web::put().to(replace_tiers::<S>))
    .route("/tiers/resolve", web::get().to(resolve::<S>))
    .route("/tiers/edits", web::post().to(apply_edits::<S>))
    .route("/tiers/{category_id}/levels", web::post().to(add_level::<S>))
    .route(
        "/tiers/{category_id}/levels/{level_id}",
        web::put().to(update_level::<S>),
    )
    .route(
        "/tiers/{category_id}/levels/{level_id}",
        web::delete().to(remove_level::<S>),
    );
}

fn catalog_response(snapshot: &CatalogSnapshot) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(ETag(EntityTag::new_strong(snapshot.version().to_string())))
        .json(snapshot.categories())
}

/// Version named by `If-Match`, `None` when absent or `*`
fn expected_version(request: &HttpRequest) -> Result<Option<u64>, ApiError> {
    let Some(value) = request.headers().get(header::IF_MATCH) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| ApiError::InvalidIfMatch(String::from_utf8_lossy(value.as_bytes()).into()))?
        .trim();
    if raw == "*" {
        return Ok(None);
    }

    let tag = raw.strip_prefix("W/").unwrap_or(raw);
    let tag = tag
        .strip_prefix('"')
        .and_then(|tag| tag.strip_suffix('"'))
        .unwrap_or(tag);
    tag.parse::<u64>()
        .map(Some)
        .map_err(|_| ApiError::InvalidIfMatch(raw.to_string()))
}

async fn health<S: CatalogStore>(service: Data<CatalogService<S>>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        catalog_version: service.snapshot().version(),
    })
}

async fn get_tiers<S: CatalogStore>(service: Data<CatalogService<S>>) -> HttpResponse {
    catalog_response(&service.snapshot())
}

async fn resolve<S: CatalogStore>(
    service: Data<CatalogService<S>>,
    params: Query<ResolveParams>,
) -> Result<HttpResponse, ApiError> {
    let resolution = service.resolve(params.referrals)?;
    Ok(HttpResponse::Ok().json(resolution))
}

async fn replace_tiers<S: CatalogStore>(
    service: Data<CatalogService<S>>,
    request: HttpRequest,
    body: Json<Vec<Category>>,
) -> Result<HttpResponse, ApiError> {
    let expected = expected_version(&request)?;
    let snapshot = service.replace(body.into_inner(), expected).await?;
    Ok(catalog_response(&snapshot))
}

async fn apply_edits<S: CatalogStore>(
    service: Data<CatalogService<S>>,
    request: HttpRequest,
    edits: Json<Vec<CatalogEdit>>,
) -> Result<HttpResponse, ApiError> {
    let expected = expected_version(&request)?;
    let edits = edits.into_inner();
    if edits.is_empty() {
        return Err(ApiError::BadRequest("no catalog edits given".to_string()));
    }
    if log::log_enabled!(log::Level::Debug) {
        debug!("Applying {} catalog edits", edits.len());
    }
    let snapshot = service.edit_batch(edits, expected).await?;
    Ok(catalog_response(&snapshot))
}

async fn add_level<S: CatalogStore>(
    service: Data<CatalogService<S>>,
    request: HttpRequest,
    path: Path<String>,
    form: Json<LevelForm>,
) -> Result<HttpResponse, ApiError> {
    let expected = expected_version(&request)?;
    let edit = CatalogEdit::AddLevel {
        category_id: path.into_inner(),
        form: form.into_inner(),
    };
    apply(&service, edit, expected).await
}

async fn update_level<S: CatalogStore>(
    service: Data<CatalogService<S>>,
    request: HttpRequest,
    path: Path<(String, String)>,
    form: Json<LevelForm>,
) -> Result<HttpResponse, ApiError> {
    let expected = expected_version(&request)?;
    let (category_id, level_id) = path.into_inner();
    let edit = CatalogEdit::UpdateLevel {
        category_id,
        level_id,
        form: form.into_inner(),
    };
    apply(&service, edit, expected).await
}

async fn remove_level<S: CatalogStore>(
    service: Data<CatalogService<S>>,
    request: HttpRequest,
    path: Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let expected = expected_version(&request)?;
    let (category_id, level_id) = path.into_inner();
    apply(
        &service,
        CatalogEdit::RemoveLevel {
            category_id,
            level_id,
        },
        expected,
    )
    .await
}

async fn apply<S: CatalogStore>(
    service: &CatalogService<S>,
    edit: CatalogEdit,
    expected: Option<u64>,
) -> Result<HttpResponse, ApiError> {
    if log::log_enabled!(log::Level::Debug) {
        debug!("Applying catalog edit {:?}", edit);
    }
    let snapshot = service.edit(edit, expected).await?;
    Ok(catalog_response(&snapshot))
}
