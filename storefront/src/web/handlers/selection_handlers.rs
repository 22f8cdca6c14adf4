// storefront/src/web/handlers/selection_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use super::cart_handlers::{CartItemPayload, ProductRefPayload};
use crate::errors::AppError;
use crate::services::selection_store::SelectionRequest;
use crate::state::AppState;
use crate::web::gate::{Authorized, CustomerTier};

#[instrument(name = "handler::get_selection", skip_all, fields(user_id = %user.user_id()))]
pub async fn get_selection_handler(
  app_state: web::Data<AppState>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let selection = app_state.selections.get(user.user_id()).await?;
  Ok(HttpResponse::Ok().json(selection))
}

#[instrument(
  name = "handler::add_selected_item",
  skip(app_state, payload, user),
  fields(user_id = %user.user_id(), product_id = %payload.product_id)
)]
pub async fn add_selected_item_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CartItemPayload>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let selection = app_state
    .selections
    .add_item(user.user_id(), payload.product_id, payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(selection))
}

#[instrument(
  name = "handler::add_multiple_selected_items",
  skip(app_state, payload, user),
  fields(user_id = %user.user_id(), count = payload.len())
)]
pub async fn add_multiple_selected_items_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<Vec<SelectionRequest>>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let selection = app_state
    .selections
    .add_multiple(user.user_id(), payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(selection))
}

#[instrument(
  name = "handler::update_selected_item",
  skip(app_state, payload, user),
  fields(user_id = %user.user_id(), product_id = %payload.product_id)
)]
pub async fn update_selected_item_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CartItemPayload>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let selection = app_state
    .selections
    .set_quantity(user.user_id(), payload.product_id, payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(selection))
}

#[instrument(
  name = "handler::remove_selected_item",
  skip(app_state, payload, user),
  fields(user_id = %user.user_id(), product_id = %payload.product_id)
)]
pub async fn remove_selected_item_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ProductRefPayload>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let remaining = app_state
    .selections
    .remove_item(user.user_id(), payload.product_id)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "selection": remaining })))
}

#[instrument(name = "handler::clear_selection", skip_all, fields(user_id = %user.user_id()))]
pub async fn clear_selection_handler(
  app_state: web::Data<AppState>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  app_state.selections.clear(user.user_id()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Selection cleared." })))
}
