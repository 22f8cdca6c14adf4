// storefront/src/services/bookings.rs

use super::cart_store::ensure_quantity;
use super::catalog::{require_item, CatalogReader};
use super::{read_modify_write, Mutation};
use crate::errors::{AppError, Resource, Result};
use crate::models::{BookingStatus, CatalogKind, ServiceBooking};
use crate::store::{DocumentCollection, Precondition, SharedCollection};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
  pub service_id: Uuid,
  #[serde(default = "one")]
  pub quantity: u32,
  pub booking_date: DateTime<Utc>,
}

fn one() -> u32 {
  1
}

#[derive(Clone)]
pub struct BookingService {
  bookings: SharedCollection<ServiceBooking>,
  catalog: Arc<dyn CatalogReader>,
}

impl BookingService {
  pub fn new(bookings: SharedCollection<ServiceBooking>, catalog: Arc<dyn CatalogReader>) -> Self {
    Self { bookings, catalog }
  }

  /// Books a catalog service at its current price.
  #[instrument(name = "BookingService::create", skip(self, request), fields(service_id = %request.service_id), err(Display))]
  pub async fn create(&self, owner: Uuid, request: BookingRequest) -> Result<ServiceBooking> {
    ensure_quantity(request.quantity)?;
    let service = require_item(self.catalog.as_ref(), request.service_id).await?;
    if service.kind != CatalogKind::Service {
      return Err(AppError::Validation(format!("{} is not a bookable service", service.id)));
    }
    let total_price_cents = service
      .price_cents
      .checked_mul(i64::from(request.quantity))
      .ok_or_else(|| AppError::Validation("booking total is out of range".to_string()))?;

    let now = Utc::now();
    let booking = ServiceBooking {
      id: Uuid::new_v4(),
      owner,
      service_id: service.id,
      service_name: service.name,
      quantity: request.quantity,
      total_price_cents,
      status: BookingStatus::Pending,
      booking_date: request.booking_date,
      created_at: now,
      updated_at: now,
    };
    self.bookings.put(&booking, Precondition::Absent).await?;
    info!(booking_id = %booking.id, "Service booked.");
    Ok(booking)
  }

  /// Newest first.
  pub async fn list(&self, owner: Uuid) -> Result<Vec<ServiceBooking>> {
    let mut bookings = self.bookings.find_by_owner(owner).await?;
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    Ok(bookings)
  }

  #[instrument(name = "BookingService::update_status", skip(self), err(Display))]
  pub async fn update_status(&self, booking_id: Uuid, status: BookingStatus) -> Result<ServiceBooking> {
    let written = read_modify_write(self.bookings.as_ref(), booking_id, |current| {
      let mut booking = current.ok_or(AppError::NotFound(Resource::Booking(booking_id)))?;
      booking.status = status;
      booking.updated_at = Utc::now();
      Ok(Mutation::Put(booking))
    })
    .await?;

    written.ok_or(AppError::NotFound(Resource::Booking(booking_id)))
  }
}
