// storefront/src/models/selection.rs

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A checkout candidate. Name and image are frozen when the item is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
  pub product_id: Uuid,
  pub quantity: u32,
  pub unit_price_cents: i64,
  pub name: String,
  pub image_url: Option<String>,
}

/// The items a user has staged for the next order; one document per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedItems {
  pub owner: Uuid,
  /// Regenerated on every change. Orders remember the revision they were
  /// built from, which makes order creation idempotent per selection.
  pub revision: Uuid,
  pub items: Vec<SelectedItem>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl SelectedItems {
  pub fn new(owner: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      owner,
      revision: Uuid::new_v4(),
      items: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  /// Merges by product id. An existing entry keeps its captured display
  /// fields and price; only the quantity grows.
  pub fn merge_item(&mut self, incoming: SelectedItem, now: DateTime<Utc>) {
    match self.items.iter_mut().find(|item| item.product_id == incoming.product_id) {
      Some(existing) => existing.quantity = existing.quantity.saturating_add(incoming.quantity),
      None => self.items.push(incoming),
    }
    self.touch(now);
  }

  pub fn set_quantity(&mut self, product_id: Uuid, quantity: u32, now: DateTime<Utc>) -> bool {
    match self.items.iter_mut().find(|item| item.product_id == product_id) {
      Some(existing) => {
        existing.quantity = quantity;
        self.touch(now);
        true
      }
      None => false,
    }
  }

  pub fn remove_item(&mut self, product_id: Uuid, now: DateTime<Utc>) -> bool {
    let before = self.items.len();
    self.items.retain(|item| item.product_id != product_id);
    let removed = self.items.len() != before;
    if removed {
      self.touch(now);
    }
    removed
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  fn touch(&mut self, now: DateTime<Utc>) {
    self.revision = Uuid::new_v4();
    self.updated_at = now;
  }
}

impl Document for SelectedItems {
  const COLLECTION: &'static str = "selected_items";

  fn key(&self) -> Uuid {
    self.owner
  }

  fn owner(&self) -> Option<Uuid> {
    Some(self.owner)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(product_id: Uuid, quantity: u32, name: &str) -> SelectedItem {
    SelectedItem {
      product_id,
      quantity,
      unit_price_cents: 1_000,
      name: name.to_string(),
      image_url: None,
    }
  }

  #[test]
  fn merge_keeps_first_captured_display_fields() {
    let now = Utc::now();
    let product = Uuid::new_v4();
    let mut selection = SelectedItems::new(Uuid::new_v4(), now);

    selection.merge_item(item(product, 1, "Espresso beans"), now);
    selection.merge_item(item(product, 2, "Renamed beans"), now);

    assert_eq!(selection.items.len(), 1);
    assert_eq!(selection.items[0].quantity, 3);
    assert_eq!(selection.items[0].name, "Espresso beans");
  }

  #[test]
  fn every_change_rolls_the_revision() {
    let now = Utc::now();
    let product = Uuid::new_v4();
    let mut selection = SelectedItems::new(Uuid::new_v4(), now);
    let initial = selection.revision;

    selection.merge_item(item(product, 1, "Tea"), now);
    let after_add = selection.revision;
    assert_ne!(initial, after_add);

    assert!(selection.set_quantity(product, 4, now));
    assert_ne!(after_add, selection.revision);

    let before_noop = selection.revision;
    assert!(!selection.remove_item(Uuid::new_v4(), now));
    assert_eq!(before_noop, selection.revision);
  }
}
