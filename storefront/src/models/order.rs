// storefront/src/models/order.rs

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Shipped,
  Completed,
}

/// Snapshot of one purchased product; never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
  pub product_id: Uuid,
  pub quantity: u32,
  pub unit_price_cents: i64,
  pub name: String,
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub owner: Uuid,
  /// Revision of the selection this order consumed.
  pub selection_revision: Uuid,
  pub items: Vec<OrderItem>,
  pub total_price_cents: i64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Deterministic id for the order built from `(owner, selection revision)`.
  /// A repeated attempt on the same selection lands on the same id.
  pub fn id_for_selection(owner: Uuid, selection_revision: Uuid) -> Uuid {
    Uuid::new_v5(&owner, selection_revision.as_bytes())
  }

  /// Σ unit price × quantity, or `None` on overflow.
  pub fn total_of(items: &[OrderItem]) -> Option<i64> {
    items.iter().try_fold(0i64, |acc, item| {
      item
        .unit_price_cents
        .checked_mul(i64::from(item.quantity))
        .and_then(|line| acc.checked_add(line))
    })
  }

  pub fn product_ids(&self) -> HashSet<Uuid> {
    self.items.iter().map(|item| item.product_id).collect()
  }
}

impl Document for Order {
  const COLLECTION: &'static str = "orders";

  fn key(&self) -> Uuid {
    self.id
  }

  fn owner(&self) -> Option<Uuid> {
    Some(self.owner)
  }
}
