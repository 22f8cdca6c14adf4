// storefront/src/models/booking.rs

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
  Pending,
  Confirmed,
  InProgress,
  Completed,
  Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBooking {
  pub id: Uuid,
  pub owner: Uuid,
  pub service_id: Uuid,
  pub service_name: String,
  pub quantity: u32,
  pub total_price_cents: i64,
  pub status: BookingStatus,
  pub booking_date: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Document for ServiceBooking {
  const COLLECTION: &'static str = "service_bookings";

  fn key(&self) -> Uuid {
    self.id
  }

  fn owner(&self) -> Option<Uuid> {
    Some(self.owner)
  }
}
