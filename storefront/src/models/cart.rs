// storefront/src/models/cart.rs

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
  pub product_id: Uuid,
  pub quantity: u32,
  /// Catalog price when the product first entered the cart.
  pub unit_price_cents: i64,
}

/// One cart per user, keyed by the owner's id.
///
/// Holds at most one item per product; the store deletes the document
/// instead of saving an empty cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
  pub owner: Uuid,
  pub items: Vec<CartItem>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn new(owner: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      owner,
      items: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  /// Adds `quantity` to the existing entry for `product_id`, or appends one.
  pub fn merge_item(&mut self, product_id: Uuid, quantity: u32, unit_price_cents: i64, now: DateTime<Utc>) {
    match self.items.iter_mut().find(|item| item.product_id == product_id) {
      Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
      None => self.items.push(CartItem {
        product_id,
        quantity,
        unit_price_cents,
      }),
    }
    self.updated_at = now;
  }

  /// Returns false when the product is not in the cart.
  pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32, now: DateTime<Utc>) -> bool {
    match self.items.iter_mut().find(|item| item.product_id == product_id) {
      Some(existing) => {
        existing.quantity = quantity;
        self.updated_at = now;
        true
      }
      None => false,
    }
  }

  /// Returns false when the product is not in the cart.
  pub fn remove_item(&mut self, product_id: Uuid, now: DateTime<Utc>) -> bool {
    let before = self.items.len();
    self.items.retain(|item| item.product_id != product_id);
    let removed = self.items.len() != before;
    if removed {
      self.updated_at = now;
    }
    removed
  }

  /// Drops every entry whose product was consumed by an order. Returns how
  /// many entries went away.
  pub fn remove_consumed(&mut self, consumed: &HashSet<Uuid>, now: DateTime<Utc>) -> usize {
    let before = self.items.len();
    self.items.retain(|item| !consumed.contains(&item.product_id));
    let removed = before - self.items.len();
    if removed > 0 {
      self.updated_at = now;
    }
    removed
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

impl Document for Cart {
  const COLLECTION: &'static str = "carts";

  fn key(&self) -> Uuid {
    self.owner
  }

  fn owner(&self) -> Option<Uuid> {
    Some(self.owner)
  }
}

/// A cart line joined with current catalog display fields.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
  pub product_id: Uuid,
  pub quantity: u32,
  pub unit_price_cents: i64,
  pub name: Option<String>,
  pub image_url: Option<String>,
  pub current_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
  pub owner: Uuid,
  pub items: Vec<CartLine>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
