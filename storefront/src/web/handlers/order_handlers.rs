// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::state::AppState;
use crate::web::gate::{Authorized, CustomerTier, StaffTier};

#[derive(Deserialize, Debug)]
pub struct OrderStatusPayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::place_order", skip_all, fields(user_id = %user.user_id()))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.place_order(user.user_id()).await?;
  info!(order_id = %order.id, total_cents = order.total_price_cents, "Order placed via API.");
  Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::list_orders", skip_all, fields(user_id = %user.user_id()))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.list_orders(user.user_id()).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip(app_state, user), fields(user_id = %user.user_id()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.get_order(&user.claims, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::cancel_order", skip(app_state, user), fields(user_id = %user.user_id()))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  app_state.orders.cancel_order(&user.claims, order_id).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": "Order cancelled.",
    "order_id": order_id
  })))
}

/// Retries cart reconciliation and selection cleanup for an existing order.
#[instrument(name = "handler::reconcile_order", skip(app_state, user), fields(user_id = %user.user_id()))]
pub async fn reconcile_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state.orders.resume_cleanup(&user.claims, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(outcome))
}

#[instrument(name = "handler::update_order_status", skip(app_state, payload, user), fields(user_id = %user.user_id(), status = ?payload.status))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<OrderStatusPayload>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.update_status(path.into_inner(), payload.status).await?;
  Ok(HttpResponse::Ok().json(order))
}
