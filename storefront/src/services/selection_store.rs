// storefront/src/services/selection_store.rs

use super::cart_store::ensure_quantity;
use super::catalog::{require_product, CatalogReader};
use super::{read_modify_write, Mutation};
use crate::errors::{AppError, Resource, Result};
use crate::models::{CatalogItem, SelectedItem, SelectedItems};
use crate::store::{DocumentCollection, Precondition, SharedCollection};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SelectionRequest {
  pub product_id: Uuid,
  pub quantity: u32,
}

fn selected_from(product: &CatalogItem, quantity: u32) -> SelectedItem {
  SelectedItem {
    product_id: product.id,
    quantity,
    unit_price_cents: product.price_cents,
    name: product.name.clone(),
    image_url: product.image_url.clone(),
  }
}

/// Per-user staging area for the next order.
#[derive(Clone)]
pub struct SelectionStore {
  selections: SharedCollection<SelectedItems>,
  catalog: Arc<dyn CatalogReader>,
}

impl SelectionStore {
  pub fn new(selections: SharedCollection<SelectedItems>, catalog: Arc<dyn CatalogReader>) -> Self {
    Self { selections, catalog }
  }

  async fn merge_all(&self, owner: Uuid, incoming: Vec<SelectedItem>) -> Result<SelectedItems> {
    let written = read_modify_write(self.selections.as_ref(), owner, |current| {
      let now = Utc::now();
      let mut selection = current.unwrap_or_else(|| SelectedItems::new(owner, now));
      for item in &incoming {
        selection.merge_item(item.clone(), now);
      }
      Ok(Mutation::Put(selection))
    })
    .await?;

    written.ok_or_else(|| AppError::Internal("selection vanished after write".to_string()))
  }

  #[instrument(name = "SelectionStore::add_item", skip(self), err(Display))]
  pub async fn add_item(&self, owner: Uuid, product_id: Uuid, quantity: u32) -> Result<SelectedItems> {
    ensure_quantity(quantity)?;
    let product = require_product(self.catalog.as_ref(), product_id).await?;
    self.merge_all(owner, vec![selected_from(&product, quantity)]).await
  }

  /// All products are resolved before anything is written, so an unknown
  /// product leaves the selection untouched.
  #[instrument(name = "SelectionStore::add_multiple", skip(self, requests), fields(count = requests.len()), err(Display))]
  pub async fn add_multiple(&self, owner: Uuid, requests: Vec<SelectionRequest>) -> Result<SelectedItems> {
    if requests.is_empty() {
      return Err(AppError::Validation("at least one item is required".to_string()));
    }
    let mut incoming = Vec::with_capacity(requests.len());
    for request in &requests {
      ensure_quantity(request.quantity)?;
      let product = require_product(self.catalog.as_ref(), request.product_id).await?;
      incoming.push(selected_from(&product, request.quantity));
    }
    self.merge_all(owner, incoming).await
  }

  #[instrument(name = "SelectionStore::set_quantity", skip(self), err(Display))]
  pub async fn set_quantity(&self, owner: Uuid, product_id: Uuid, quantity: u32) -> Result<SelectedItems> {
    ensure_quantity(quantity)?;
    let written = read_modify_write(self.selections.as_ref(), owner, |current| {
      let mut selection = current.ok_or(AppError::NotFound(Resource::SelectedItems))?;
      if !selection.set_quantity(product_id, quantity, Utc::now()) {
        return Err(AppError::NotFound(Resource::SelectedItem(product_id)));
      }
      Ok(Mutation::Put(selection))
    })
    .await?;

    written.ok_or_else(|| AppError::Internal("selection vanished after write".to_string()))
  }

  #[instrument(name = "SelectionStore::remove_item", skip(self), err(Display))]
  pub async fn remove_item(&self, owner: Uuid, product_id: Uuid) -> Result<Option<SelectedItems>> {
    read_modify_write(self.selections.as_ref(), owner, |current| {
      let mut selection = current.ok_or(AppError::NotFound(Resource::SelectedItems))?;
      if !selection.remove_item(product_id, Utc::now()) {
        return Err(AppError::NotFound(Resource::SelectedItem(product_id)));
      }
      if selection.is_empty() {
        Ok(Mutation::Delete)
      } else {
        Ok(Mutation::Put(selection))
      }
    })
    .await
  }

  /// Deletes the whole selection. Clearing an absent selection succeeds.
  #[instrument(name = "SelectionStore::clear", skip(self), err(Display))]
  pub async fn clear(&self, owner: Uuid) -> Result<()> {
    if self.selections.delete(owner, Precondition::Any).await? {
      info!(%owner, "Selection cleared.");
    }
    Ok(())
  }

  #[instrument(name = "SelectionStore::get", skip(self), err(Display))]
  pub async fn get(&self, owner: Uuid) -> Result<SelectedItems> {
    self
      .selections
      .find(owner)
      .await?
      .map(|found| found.doc)
      .ok_or(AppError::NotFound(Resource::SelectedItems))
  }
}
