// storefront/src/models/catalog.rs

use crate::store::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
  Product,
  Service,
}

/// A product or bookable service. Prices are in cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
  pub id: Uuid,
  pub kind: CatalogKind,
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  /// Units on hand; services have none.
  pub stock: Option<i64>,
  pub image_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Document for CatalogItem {
  const COLLECTION: &'static str = "catalog";

  fn key(&self) -> Uuid {
    self.id
  }
}
