// storefront/src/services/cart_store.rs

use super::catalog::{require_product, CatalogReader};
use super::{read_modify_write, Mutation};
use crate::errors::{AppError, Resource, Result};
use crate::models::{Cart, CartLine, CartView};
use crate::store::{DocumentCollection, SharedCollection};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub(crate) fn ensure_quantity(quantity: u32) -> Result<()> {
  if quantity == 0 {
    return Err(AppError::Validation("quantity must be at least 1".to_string()));
  }
  Ok(())
}

/// Per-user cart operations. The cart document exists only while it holds items.
#[derive(Clone)]
pub struct CartStore {
  carts: SharedCollection<Cart>,
  catalog: Arc<dyn CatalogReader>,
}

impl CartStore {
  pub fn new(carts: SharedCollection<Cart>, catalog: Arc<dyn CatalogReader>) -> Self {
    Self { carts, catalog }
  }

  #[instrument(name = "CartStore::add_item", skip(self), err(Display))]
  pub async fn add_item(&self, owner: Uuid, product_id: Uuid, quantity: u32) -> Result<Cart> {
    ensure_quantity(quantity)?;
    let product = require_product(self.catalog.as_ref(), product_id).await?;

    let written = read_modify_write(self.carts.as_ref(), owner, |current| {
      let now = Utc::now();
      let mut cart = current.unwrap_or_else(|| Cart::new(owner, now));
      cart.merge_item(product_id, quantity, product.price_cents, now);
      Ok(Mutation::Put(cart))
    })
    .await?;

    written.ok_or_else(|| AppError::Internal("cart vanished after write".to_string()))
  }

  #[instrument(name = "CartStore::set_quantity", skip(self), err(Display))]
  pub async fn set_quantity(&self, owner: Uuid, product_id: Uuid, quantity: u32) -> Result<Cart> {
    ensure_quantity(quantity)?;
    let written = read_modify_write(self.carts.as_ref(), owner, |current| {
      let mut cart = current.ok_or(AppError::NotFound(Resource::Cart))?;
      if !cart.set_quantity(product_id, quantity, Utc::now()) {
        return Err(AppError::NotFound(Resource::CartItem(product_id)));
      }
      Ok(Mutation::Put(cart))
    })
    .await?;

    written.ok_or_else(|| AppError::Internal("cart vanished after write".to_string()))
  }

  /// Returns the remaining cart, or `None` once the last item is gone.
  #[instrument(name = "CartStore::remove_item", skip(self), err(Display))]
  pub async fn remove_item(&self, owner: Uuid, product_id: Uuid) -> Result<Option<Cart>> {
    read_modify_write(self.carts.as_ref(), owner, |current| {
      let mut cart = current.ok_or(AppError::NotFound(Resource::Cart))?;
      if !cart.remove_item(product_id, Utc::now()) {
        return Err(AppError::NotFound(Resource::CartItem(product_id)));
      }
      if cart.is_empty() {
        debug!("Last cart item removed, deleting cart.");
        Ok(Mutation::Delete)
      } else {
        Ok(Mutation::Put(cart))
      }
    })
    .await
  }

  /// Removes every item an order consumed. Safe to repeat; absent carts are a no-op.
  #[instrument(name = "CartStore::reconcile_after_order", skip(self, consumed), fields(consumed = consumed.len()), err(Display))]
  pub async fn reconcile_after_order(&self, owner: Uuid, consumed: &HashSet<Uuid>) -> Result<Option<Cart>> {
    read_modify_write(self.carts.as_ref(), owner, |current| {
      let Some(mut cart) = current else {
        return Ok(Mutation::Unchanged(None));
      };
      if cart.remove_consumed(consumed, Utc::now()) == 0 {
        return Ok(Mutation::Unchanged(Some(cart)));
      }
      if cart.is_empty() {
        Ok(Mutation::Delete)
      } else {
        Ok(Mutation::Put(cart))
      }
    })
    .await
  }

  pub async fn find(&self, owner: Uuid) -> Result<Option<Cart>> {
    Ok(self.carts.find(owner).await?.map(|found| found.doc))
  }

  /// Joins every line with current catalog display fields. A product that
  /// has left the catalog keeps its line with empty display fields.
  #[instrument(name = "CartStore::get_cart", skip(self), err(Display))]
  pub async fn get_cart(&self, owner: Uuid) -> Result<CartView> {
    let cart = self.find(owner).await?.ok_or(AppError::NotFound(Resource::Cart))?;

    let mut items = Vec::with_capacity(cart.items.len());
    for item in &cart.items {
      let product = match self.catalog.lookup(item.product_id).await {
        Ok(found) => found,
        Err(e) => {
          warn!(product_id = %item.product_id, error = %e, "Catalog lookup failed for cart line.");
          None
        }
      };
      if product.is_none() {
        warn!(product_id = %item.product_id, "Cart line refers to a product missing from the catalog.");
      }
      items.push(CartLine {
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price_cents: item.unit_price_cents,
        name: product.as_ref().map(|p| p.name.clone()),
        image_url: product.as_ref().and_then(|p| p.image_url.clone()),
        current_price_cents: product.as_ref().map(|p| p.price_cents),
      });
    }

    Ok(CartView {
      owner: cart.owner,
      items,
      created_at: cart.created_at,
      updated_at: cart.updated_at,
    })
  }
}
