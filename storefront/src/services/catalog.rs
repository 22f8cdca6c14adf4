// storefront/src/services/catalog.rs

use crate::errors::{AppError, Resource, Result};
use crate::models::{CatalogItem, CatalogKind};
use crate::store::{DocumentCollection, Precondition, SharedCollection, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Read-only view of current catalog prices and display fields.
#[async_trait]
pub trait CatalogReader: Send + Sync {
  async fn lookup(&self, id: Uuid) -> Result<Option<CatalogItem>, StoreError>;
}

/// Staff-supplied fields for creating or replacing a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogInput {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub price_cents: i64,
  #[serde(default)]
  pub stock: Option<i64>,
  #[serde(default)]
  pub image_url: Option<String>,
}

impl CatalogInput {
  fn validate(&self, kind: CatalogKind) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if self.price_cents < 0 {
      return Err(AppError::Validation("price_cents must not be negative".to_string()));
    }
    match (kind, self.stock) {
      (CatalogKind::Product, Some(stock)) if stock < 0 => {
        Err(AppError::Validation("stock must not be negative".to_string()))
      }
      (CatalogKind::Service, Some(_)) => Err(AppError::Validation("services carry no stock".to_string())),
      _ => Ok(()),
    }
  }
}

#[derive(Clone)]
pub struct CatalogService {
  items: SharedCollection<CatalogItem>,
}

impl CatalogService {
  pub fn new(items: SharedCollection<CatalogItem>) -> Self {
    Self { items }
  }

  fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(Resource::Product(id))
  }

  #[instrument(name = "CatalogService::list", skip(self), err(Display))]
  pub async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogItem>> {
    let mut items: Vec<CatalogItem> = self
      .items
      .find_all()
      .await?
      .into_iter()
      .filter(|item| item.kind == kind)
      .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Ok(items)
  }

  #[instrument(name = "CatalogService::get", skip(self), err(Display))]
  pub async fn get(&self, kind: CatalogKind, id: Uuid) -> Result<CatalogItem> {
    match self.items.find(id).await? {
      Some(found) if found.doc.kind == kind => Ok(found.doc),
      _ => Err(Self::not_found(id)),
    }
  }

  #[instrument(name = "CatalogService::create", skip(self, input), fields(name = %input.name), err(Display))]
  pub async fn create(&self, kind: CatalogKind, input: CatalogInput) -> Result<CatalogItem> {
    input.validate(kind)?;
    let now = Utc::now();
    let item = CatalogItem {
      id: Uuid::new_v4(),
      kind,
      name: input.name,
      description: input.description,
      price_cents: input.price_cents,
      stock: input.stock,
      image_url: input.image_url,
      created_at: now,
      updated_at: now,
    };
    self.items.put(&item, Precondition::Absent).await?;
    info!(item_id = %item.id, ?kind, "Catalog entry created.");
    Ok(item)
  }

  /// Replaces every editable field; price changes never touch existing
  /// cart snapshots or orders.
  #[instrument(name = "CatalogService::update", skip(self, input), err(Display))]
  pub async fn update(&self, kind: CatalogKind, id: Uuid, input: CatalogInput) -> Result<CatalogItem> {
    input.validate(kind)?;
    let current = match self.items.find(id).await? {
      Some(found) if found.doc.kind == kind => found,
      _ => return Err(Self::not_found(id)),
    };
    let item = CatalogItem {
      name: input.name,
      description: input.description,
      price_cents: input.price_cents,
      stock: input.stock,
      image_url: input.image_url,
      updated_at: Utc::now(),
      ..current.doc
    };
    self.items.put(&item, Precondition::Version(current.version)).await?;
    Ok(item)
  }

  #[instrument(name = "CatalogService::delete", skip(self), err(Display))]
  pub async fn delete(&self, kind: CatalogKind, id: Uuid) -> Result<()> {
    match self.items.find(id).await? {
      Some(found) if found.doc.kind == kind => {
        self.items.delete(id, Precondition::Version(found.version)).await?;
        info!(item_id = %id, "Catalog entry deleted.");
        Ok(())
      }
      _ => Err(Self::not_found(id)),
    }
  }
}

#[async_trait]
impl CatalogReader for CatalogService {
  async fn lookup(&self, id: Uuid) -> Result<Option<CatalogItem>, StoreError> {
    Ok(self.items.find(id).await?.map(|found| found.doc))
  }
}

/// Looks up `id` of any kind, mapping absence to `NotFound(Product)`.
pub async fn require_item(catalog: &dyn CatalogReader, id: Uuid) -> Result<CatalogItem> {
  catalog
    .lookup(id)
    .await?
    .ok_or(AppError::NotFound(Resource::Product(id)))
}

/// Like [`require_item`], but a service id counts as a missing product.
pub async fn require_product(catalog: &dyn CatalogReader, id: Uuid) -> Result<CatalogItem> {
  match require_item(catalog, id).await? {
    item if item.kind == CatalogKind::Product => Ok(item),
    item => {
      debug!(item_id = %id, kind = ?item.kind, "Catalog entry is not a product.");
      Err(AppError::NotFound(Resource::Product(id)))
    }
  }
}
