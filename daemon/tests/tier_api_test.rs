//! HTTP tests for the tier endpoints
//!
//! Each test builds the actix application in-process on top of a memory or
//! temporary-directory store.

#![allow(clippy::disallowed_methods)]

use actix_web::{
    http::{header, StatusCode},
    test, web, App,
};
use fature_common::{
    api::{ErrorKind, ErrorResponse, FormErrorResponse, HealthResponse, ValidationErrorResponse},
    tier::{default_categories, CatalogSnapshot, Category, Invariant, Resolution, TierCatalog},
};
use fature_daemon::{
    core::{
        error::ServiceError,
        storage::{CatalogStore, JsonFileStore, MemoryStore},
        CatalogService,
    },
    rpc::tiers,
};
use serde_json::json;
use std::sync::Arc;
use tempdir::TempDir;

async fn memory_service() -> Arc<CatalogService<MemoryStore>> {
    Arc::new(
        CatalogService::load(MemoryStore::new(), true)
            .await
            .unwrap(),
    )
}

macro_rules! app {
    ($service:expr, $store:ty) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($service.clone()))
                .configure(tiers::configure::<$store>),
        )
        .await
    };
}

fn etag(response: &actix_web::dev::ServiceResponse) -> String {
    response
        .headers()
        .get(header::ETAG)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[actix_web::test]
async fn test_health() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let request = test::TestRequest::get().uri("/health").to_request();
    let health: HealthResponse = test::call_and_read_body_json(&app, request).await;
    assert_eq!(health.status, "ok");
    assert_eq!(health.catalog_version, 1);
}

#[actix_web::test]
async fn test_get_tiers_with_etag() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let request = test::TestRequest::get().uri("/tiers").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(etag(&response), "\"1\"");

    let categories: Vec<Category> = test::read_body_json(response).await;
    assert_eq!(categories, default_categories());
}

#[actix_web::test]
async fn test_resolve_concrete_counts() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    for (referrals, category, level, rev_total) in [
        (0u64, "jogador", "level-1", 5.0),
        (95, "afiliado", "level-7", 30.0),
        (101, "profissional", "level-1", 34.0),
        (1_000_000, "lenda", "level-3", 70.0),
    ] {
        let request = test::TestRequest::get()
            .uri(&format!("/tiers/resolve?referrals={}", referrals))
            .to_request();
        let resolution: Resolution = test::call_and_read_body_json(&app, request).await;
        assert_eq!(resolution.category.id, category);
        assert_eq!(resolution.level.id, level);
        assert_eq!(resolution.level.benefits.rev_total, rev_total);
    }
}

#[actix_web::test]
async fn test_resolve_body_shape() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let request = test::TestRequest::get()
        .uri("/tiers/resolve?referrals=95")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(
        body["category"],
        json!({"id": "afiliado", "name": "Afiliado", "description": "Regular affiliate"})
    );
    assert_eq!(body["level"]["requirements"]["minReferrals"], 91);
    assert_eq!(body["level"]["benefits"]["revLevel1"], 18.0);
}

#[actix_web::test]
async fn test_resolve_bad_query() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    for uri in [
        "/tiers/resolve",
        "/tiers/resolve?referrals=abc",
        "/tiers/resolve?referrals=-1",
    ] {
        let request = test::TestRequest::get().uri(uri).to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body: ErrorResponse = test::read_body_json(response).await;
        assert_eq!(body.kind, ErrorKind::BadRequest);
    }
}

#[actix_web::test]
async fn test_resolve_integrity_error_is_404() {
    // Iniciante no longer starts at 15
    let mut categories = default_categories();
    categories[1].levels[0].requirements.min_referrals = 16;
    let service = Arc::new(CatalogService::new(
        TierCatalog::from_snapshot(CatalogSnapshot::new_unchecked(categories, 1)),
        MemoryStore::new(),
    ));
    let app = app!(service, MemoryStore);

    let request = test::TestRequest::get()
        .uri("/tiers/resolve?referrals=15")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = test::read_body_json(response).await;
    assert_eq!(body.kind, ErrorKind::CatalogIntegrity);
    assert!(body.error.contains("15"), "{}", body.error);

    // counts outside the hole still resolve
    let request = test::TestRequest::get()
        .uri("/tiers/resolve?referrals=16")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_broken_catalog_file_refused_at_boot() {
    let tmp = TempDir::new("fature-api").unwrap();
    let path = tmp.path().join("tiers.json");

    let mut categories = default_categories();
    categories[1].levels[0].requirements.min_referrals = 16;
    std::fs::write(
        &path,
        serde_json::to_vec(&json!({
            "version": 2,
            "updatedAt": "2026-01-01T00:00:00Z",
            "categories": categories,
        }))
        .unwrap(),
    )
    .unwrap();

    assert!(matches!(
        CatalogService::load(JsonFileStore::new(&path), true).await,
        Err(ServiceError::InvalidStoredCatalog { version: 2, .. })
    ));
}

#[actix_web::test]
async fn test_replace_valid_catalog() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let mut categories = default_categories();
    categories[6].levels[2].benefits.rev_total = 72.0;

    let request = test::TestRequest::put()
        .uri("/tiers")
        .insert_header((header::IF_MATCH, "\"1\""))
        .set_json(&categories)
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(etag(&response), "\"2\"");

    let body: Vec<Category> = test::read_body_json(response).await;
    assert_eq!(body, categories);
    assert_eq!(service.snapshot().version(), 2);

    let stored = service.store().load().await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
}

#[actix_web::test]
async fn test_replace_with_gap_is_422() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let mut categories = default_categories();
    categories[3].levels[0].requirements.min_referrals = 102;

    let request = test::TestRequest::put()
        .uri("/tiers")
        .set_json(&categories)
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: ValidationErrorResponse = test::read_body_json(response).await;
    assert_eq!(body.kind, ErrorKind::Validation);
    let gap = &body.violations[0];
    assert_eq!(gap.invariant, Invariant::Gap);
    assert!(gap.message.contains("expected min=101"), "{}", gap.message);

    // nothing changed
    let request = test::TestRequest::get().uri("/tiers").to_request();
    let current: Vec<Category> = test::call_and_read_body_json(&app, request).await;
    assert_eq!(current, default_categories());
    assert_eq!(service.snapshot().version(), 1);
}

#[actix_web::test]
async fn test_replace_with_overlap_is_422() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let mut categories = default_categories();
    categories[0].levels[0].requirements.max_referrals = 6;

    let request = test::TestRequest::put()
        .uri("/tiers")
        .set_json(&categories)
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ValidationErrorResponse = test::read_body_json(response).await;
    assert!(body
        .violations
        .iter()
        .any(|violation| violation.invariant == Invariant::Overlap));
}

#[actix_web::test]
async fn test_stale_if_match_is_409() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    for expected_status in [StatusCode::OK, StatusCode::CONFLICT] {
        let request = test::TestRequest::put()
            .uri("/tiers")
            .insert_header((header::IF_MATCH, "\"1\""))
            .set_json(default_categories())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), expected_status);
    }
    assert_eq!(service.snapshot().version(), 2);
}

#[actix_web::test]
async fn test_malformed_body_is_400() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let request = test::TestRequest::put()
        .uri("/tiers")
        .insert_header(header::ContentType::json())
        .set_payload("[{\"id\": 3}]")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_store_failure_is_500() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);
    service.store().set_read_only(true);

    let request = test::TestRequest::put()
        .uri("/tiers")
        .set_json(default_categories())
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = test::read_body_json(response).await;
    assert_eq!(body.kind, ErrorKind::Storage);
    assert_eq!(service.snapshot().version(), 1);
}

#[actix_web::test]
async fn test_level_edits() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    // raise the open-ended level
    let request = test::TestRequest::put()
        .uri("/tiers/lenda/levels/level-3")
        .set_json(json!({
            "minReferrals": 5001,
            "maxReferrals": "",
            "revTotal": "71",
            "revLevel1": "42,6",
            "revLevels2to5": "7,1",
            "levelUpReward": "R$ 10.000,00"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(etag(&response), "\"2\"");
    let categories: Vec<Category> = test::read_body_json(response).await;
    let level = &categories[6].levels[2];
    assert_eq!(level.name, "Level 3");
    assert_eq!(level.benefits.rev_total, 71.0);
    assert_eq!(level.benefits.level_up_reward, 10000.0);

    // split it in two in one version
    let request = test::TestRequest::post()
        .uri("/tiers/edits")
        .insert_header((header::IF_MATCH, "\"2\""))
        .set_json(json!([
            {
                "action": "update_level",
                "categoryId": "lenda",
                "levelId": "level-3",
                "form": {
                    "minReferrals": "5001",
                    "maxReferrals": "9999",
                    "revTotal": "71",
                    "revLevel1": "42,6",
                    "revLevels2to5": "7,1"
                }
            },
            {
                "action": "add_level",
                "categoryId": "lenda",
                "form": {
                    "minReferrals": "10000",
                    "maxReferrals": "unbounded",
                    "revTotal": "72,5",
                    "revLevel1": "43,5",
                    "revLevels2to5": "7,25"
                }
            }
        ]))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(etag(&response), "\"3\"");
    let categories: Vec<Category> = test::read_body_json(response).await;
    let lenda = &categories[6];
    assert_eq!(lenda.levels.len(), 4);
    assert_eq!(lenda.levels[3].id, "level-4");
    assert_eq!(lenda.levels[3].name, "Level 4");

    let request = test::TestRequest::get()
        .uri("/tiers/resolve?referrals=20000")
        .to_request();
    let resolution: Resolution = test::call_and_read_body_json(&app, request).await;
    assert_eq!(resolution.level.id, "level-4");
    assert_eq!(resolution.level.benefits.rev_total, 72.5);

    // removing the middle level would open a gap
    let request = test::TestRequest::delete()
        .uri("/tiers/lenda/levels/level-3")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(service.snapshot().version(), 3);

    // a single add cannot fit next to an open-ended level
    let request = test::TestRequest::post()
        .uri("/tiers/lenda/levels")
        .set_json(json!({
            "minReferrals": "50000",
            "revTotal": "80",
            "revLevel1": "48",
            "revLevels2to5": "8"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let request = test::TestRequest::post()
        .uri("/tiers/edits")
        .set_json(json!([]))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_level_edit_errors() {
    let service = memory_service().await;
    let app = app!(service, MemoryStore);

    let request = test::TestRequest::delete()
        .uri("/tiers/bronze/levels/level-1")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = test::read_body_json(response).await;
    assert_eq!(body.kind, ErrorKind::NotFound);

    let request = test::TestRequest::put()
        .uri("/tiers/jogador/levels/level-1")
        .set_json(json!({
            "minReferrals": "zero",
            "maxReferrals": "4",
            "revTotal": "5",
            "revLevel1": "abc",
            "revLevels2to5": "0,5"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: FormErrorResponse = test::read_body_json(response).await;
    assert_eq!(body.kind, ErrorKind::InvalidForm);
    let fields: Vec<&str> = body.fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(fields, vec!["minReferrals", "revLevel1"]);

    assert_eq!(service.snapshot().version(), 1);
}

#[actix_web::test]
async fn test_file_store_survives_restart() {
    let tmp = TempDir::new("fature-api").unwrap();
    let path = tmp.path().join("data").join("tiers.json");

    {
        let service = Arc::new(
            CatalogService::load(JsonFileStore::new(&path), true)
                .await
                .unwrap(),
        );
        let app = app!(service, JsonFileStore);

        let mut categories = default_categories();
        categories[0].levels[0].benefits.rev_total = 5.5;
        let request = test::TestRequest::put()
            .uri("/tiers")
            .set_json(&categories)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let service = CatalogService::load(JsonFileStore::new(&path), false)
        .await
        .unwrap();
    let snapshot = service.snapshot();
    assert_eq!(snapshot.version(), 2);
    assert_eq!(snapshot.categories()[0].levels[0].benefits.rev_total, 5.5);
}
