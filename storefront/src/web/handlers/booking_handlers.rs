// storefront/src/web/handlers/booking_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::BookingStatus;
use crate::services::bookings::BookingRequest;
use crate::state::AppState;
use crate::web::gate::{Authorized, CustomerTier, StaffTier};

#[derive(Deserialize, Debug)]
pub struct BookingStatusPayload {
  pub status: BookingStatus,
}

#[instrument(name = "handler::create_booking", skip(app_state, payload, user), fields(user_id = %user.user_id()))]
pub async fn create_booking_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<BookingRequest>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let booking = app_state.bookings.create(user.user_id(), payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(booking))
}

#[instrument(name = "handler::list_bookings", skip_all, fields(user_id = %user.user_id()))]
pub async fn list_bookings_handler(
  app_state: web::Data<AppState>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let bookings = app_state.bookings.list(user.user_id()).await?;
  Ok(HttpResponse::Ok().json(bookings))
}

#[instrument(name = "handler::update_booking_status", skip(app_state, payload, user), fields(user_id = %user.user_id()))]
pub async fn update_booking_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<BookingStatusPayload>,
  user: Authorized<StaffTier>,
) -> Result<HttpResponse, AppError> {
  let booking = app_state.bookings.update_status(path.into_inner(), payload.status).await?;
  Ok(HttpResponse::Ok().json(booking))
}
