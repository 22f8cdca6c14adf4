// storefront/src/web/handlers/catalog_handlers.rs

//! Products and services share one catalog; the route decides the kind.

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::CatalogKind;
use crate::services::catalog::CatalogInput;
use crate::state::AppState;
use crate::web::gate::{Authorized, StaffTier};

#[instrument(name = "handler::list_catalog", skip(app_state))]
pub async fn list_handler(app_state: web::Data<AppState>, kind: CatalogKind) -> Result<HttpResponse, AppError> {
  let items = app_state.catalog.list(kind).await?;
  Ok(HttpResponse::Ok().json(items))
}

#[instrument(name = "handler::get_catalog_item", skip(app_state))]
pub async fn get_handler(
  app_state: web::Data<AppState>,
  kind: CatalogKind,
  id: Uuid,
) -> Result<HttpResponse, AppError> {
  let item = app_state.catalog.get(kind, id).await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::create_catalog_item", skip(app_state, payload, user), fields(user_id = %user.user_id()))]
pub async fn create_handler(
  app_state: web::Data<AppState>,
  kind: CatalogKind,
  payload: web::Json<CatalogInput>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  let item = app_state.catalog.create(kind, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(item))
}

#[instrument(name = "handler::update_catalog_item", skip(app_state, payload, user), fields(user_id = %user.user_id()))]
pub async fn update_handler(
  app_state: web::Data<AppState>,
  kind: CatalogKind,
  id: Uuid,
  payload: web::Json<CatalogInput>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  let item = app_state.catalog.update(kind, id, payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(name = "handler::delete_catalog_item", skip(app_state, user), fields(user_id = %user.user_id()))]
pub async fn delete_handler(
  app_state: web::Data<AppState>,
  kind: CatalogKind,
  id: Uuid,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  app_state.catalog.delete(kind, id).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Deleted.", "id": id })))
}

// Route adapters binding the catalog kind.

pub async fn list_products(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  list_handler(app_state, CatalogKind::Product).await
}

pub async fn list_services(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  list_handler(app_state, CatalogKind::Service).await
}

pub async fn get_product(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  get_handler(app_state, CatalogKind::Product, path.into_inner()).await
}

pub async fn get_service(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
  get_handler(app_state, CatalogKind::Service, path.into_inner()).await
}

pub async fn create_product(
  app_state: web::Data<AppState>,
  payload: web::Json<CatalogInput>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  create_handler(app_state, CatalogKind::Product, payload, user).await
}

pub async fn create_service(
  app_state: web::Data<AppState>,
  payload: web::Json<CatalogInput>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  create_handler(app_state, CatalogKind::Service, payload, user).await
}

pub async fn update_product(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<CatalogInput>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  update_handler(app_state, CatalogKind::Product, path.into_inner(), payload, user).await
}

pub async fn update_service(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<CatalogInput>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  update_handler(app_state, CatalogKind::Service, path.into_inner(), payload, user).await
}

pub async fn delete_product(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  delete_handler(app_state, CatalogKind::Product, path.into_inner(), user).await
}

pub async fn delete_service(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  delete_handler(app_state, CatalogKind::Service, path.into_inner(), user).await
}
