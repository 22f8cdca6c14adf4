// storefront/src/pipelines/order_pipeline.rs

//! Selection → order → cart reconciliation → selection cleanup.
//!
//! No step spans documents transactionally. Steps after `persist_order`
//! are idempotent so the tail can be re-run with `run_from(RESUME_STEP)`
//! once an order exists.

use crate::errors::{AppError, Resource};
use crate::models::{Order, OrderItem, OrderStatus};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::catalog::require_product;
use crate::store::{Document, Precondition, StoreError};
use chrono::Utc;
use std::sync::Arc;
use stepflow::{ContextData, Pipeline, PipelineControl, SkipCondition};
use tracing::{debug, info, instrument, warn};

pub const RESUME_STEP: &str = "load_cart";

type Ctx = ContextData<PlaceOrderCtxData>;

pub fn build_place_order_pipeline() -> Pipeline<PlaceOrderCtxData, AppError> {
  let no_cart: SkipCondition<PlaceOrderCtxData> = Arc::new(|ctx: Ctx| ctx.read().cart.is_none());

  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("load_selection", false, None),
    ("resolve_catalog", false, None),
    ("build_order", false, None),
    ("persist_order", false, None),
    ("load_cart", false, None),
    ("reconcile_cart", false, Some(no_cart)),
    ("clear_selection", false, None),
  ]);

  p.on_root("load_selection", load_selection);
  p.on_root("resolve_catalog", resolve_catalog);
  p.on_root("build_order", build_order);
  p.on_root("persist_order", persist_order);
  p.on_root("load_cart", load_cart);
  p.on_root("reconcile_cart", reconcile_cart);
  p.on_root("clear_selection", clear_selection);

  p
}

#[instrument(name = "saga::load_selection", skip_all, err(Display))]
async fn load_selection(ctx: Ctx) -> Result<PipelineControl, AppError> {
  let (owner, selections) = {
    let guard = ctx.read();
    (guard.owner, guard.deps.selections.clone())
  };

  let selection = match selections.find(owner).await? {
    Some(found) if !found.doc.is_empty() => found.doc,
    _ => {
      debug!(%owner, "Nothing selected.");
      return Err(AppError::NotFound(Resource::SelectedItems));
    }
  };

  debug!(%owner, revision = %selection.revision, items = selection.items.len(), "Selection loaded.");
  ctx.write().selection = Some(selection);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "saga::resolve_catalog", skip_all, err(Display))]
async fn resolve_catalog(ctx: Ctx) -> Result<PipelineControl, AppError> {
  let (product_ids, catalog) = {
    let guard = ctx.read();
    let ids: Vec<_> = guard
      .selection
      .iter()
      .flat_map(|s| s.items.iter().map(|item| item.product_id))
      .collect();
    (ids, guard.deps.catalog.clone())
  };

  let mut products = Vec::with_capacity(product_ids.len());
  for product_id in product_ids {
    products.push(require_product(catalog.as_ref(), product_id).await?);
  }

  ctx.write().products = products;
  Ok(PipelineControl::Continue)
}

/// Quantities come from the selection; price, name and image from the catalog as it is now.
#[instrument(name = "saga::build_order", skip_all, err(Display))]
async fn build_order(ctx: Ctx) -> Result<PipelineControl, AppError> {
  let mut guard = ctx.write();
  let selection = guard
    .selection
    .clone()
    .ok_or_else(|| AppError::Internal("build_order ran without a selection".to_string()))?;

  let items: Vec<OrderItem> = selection
    .items
    .iter()
    .zip(guard.products.iter())
    .map(|(selected, product)| OrderItem {
      product_id: product.id,
      quantity: selected.quantity,
      unit_price_cents: product.price_cents,
      name: product.name.clone(),
      image_url: product.image_url.clone(),
    })
    .collect();

  let total_price_cents =
    Order::total_of(&items).ok_or_else(|| AppError::Validation("order total is out of range".to_string()))?;

  let now = Utc::now();
  guard.order = Some(Order {
    id: Order::id_for_selection(guard.owner, selection.revision),
    owner: guard.owner,
    selection_revision: selection.revision,
    items,
    total_price_cents,
    status: OrderStatus::Pending,
    created_at: now,
    updated_at: now,
  });
  Ok(PipelineControl::Continue)
}

/// Insert-if-absent. An order already stored for this selection revision is adopted.
#[instrument(name = "saga::persist_order", skip_all, err(Display))]
async fn persist_order(ctx: Ctx) -> Result<PipelineControl, AppError> {
  let (order, orders) = {
    let guard = ctx.read();
    let order = guard
      .order
      .clone()
      .ok_or_else(|| AppError::Internal("persist_order ran without an order".to_string()))?;
    (order, guard.deps.orders.clone())
  };

  match orders.put(&order, Precondition::Absent).await {
    Ok(_) => {
      info!(order_id = %order.id, owner = %order.owner, total_cents = order.total_price_cents, "Order created.");
    }
    Err(StoreError::Conflict { .. }) => {
      let existing = orders.find(order.id).await?.ok_or(StoreError::Conflict {
        collection: Order::COLLECTION,
        key: order.id,
      })?;
      warn!(order_id = %order.id, "Order for this selection already exists, continuing with it.");
      let mut guard = ctx.write();
      guard.order = Some(existing.doc);
      guard.order_reused = true;
    }
    Err(other) => return Err(other.into()),
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "saga::load_cart", skip_all, err(Display))]
async fn load_cart(ctx: Ctx) -> Result<PipelineControl, AppError> {
  let (owner, carts) = {
    let guard = ctx.read();
    (guard.owner, guard.deps.carts.clone())
  };
  let cart = carts.find(owner).await?;
  if cart.is_none() {
    debug!(%owner, "No cart to reconcile.");
  }
  ctx.write().cart = cart;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "saga::reconcile_cart", skip_all, err(Display))]
async fn reconcile_cart(ctx: Ctx) -> Result<PipelineControl, AppError> {
  let (owner, consumed, carts) = {
    let guard = ctx.read();
    let consumed = guard
      .order
      .as_ref()
      .map(Order::product_ids)
      .ok_or_else(|| AppError::Internal("reconcile_cart ran without an order".to_string()))?;
    (guard.owner, consumed, guard.deps.carts.clone())
  };

  let remaining = carts.reconcile_after_order(owner, &consumed).await?;
  let mut guard = ctx.write();
  guard.cart = remaining;
  guard.cart_items_removed = true;
  Ok(PipelineControl::Continue)
}

/// Clears the selection only while it still holds the revision the order
/// was built from. Items added since then survive for a later order.
#[instrument(name = "saga::clear_selection", skip_all, err(Display))]
async fn clear_selection(ctx: Ctx) -> Result<PipelineControl, AppError> {
  let (owner, revision, selections) = {
    let guard = ctx.read();
    let revision = guard
      .order
      .as_ref()
      .map(|o| o.selection_revision)
      .ok_or_else(|| AppError::Internal("clear_selection ran without an order".to_string()))?;
    (guard.owner, revision, guard.deps.selections.clone())
  };

  let cleared = match selections.find(owner).await? {
    Some(found) if found.doc.revision == revision => {
      match selections.delete(owner, Precondition::Version(found.version)).await {
        Ok(removed) => removed,
        Err(StoreError::Conflict { .. }) => {
          info!(%owner, "Selection changed while cleaning up, leaving it in place.");
          false
        }
        Err(other) => return Err(other.into()),
      }
    }
    Some(_) => {
      info!(%owner, "Selection changed since the order was built, leaving it in place.");
      false
    }
    None => false,
  };

  ctx.write().selection_cleared = cleared;
  Ok(PipelineControl::Continue)
}
