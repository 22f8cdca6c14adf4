// storefront/src/services/orders.rs

use super::{read_modify_write, Mutation};
use crate::errors::{AppError, Resource, Result};
use crate::models::{Order, OrderStatus, Role};
use crate::pipelines::contexts::{PlaceOrderCtxData, SagaDeps};
use crate::pipelines::order_pipeline::RESUME_STEP;
use crate::services::token_service::Claims;
use crate::store::{DocumentCollection, Precondition};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use stepflow::{ContextData, PipelineResult, Registry};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The acting user may touch documents they own; Admin-tier may touch any.
pub fn ensure_can_act_on(actor: &Claims, owner: Uuid) -> Result<()> {
  if actor.sub == owner || actor.role.satisfies(Role::Admin) {
    return Ok(());
  }
  Err(AppError::Forbidden("not the owner of this resource".to_string()))
}

/// What a saga run did besides producing the order.
#[derive(Debug, Clone, Serialize)]
pub struct SagaOutcome {
  pub order: Order,
  /// The order had already been stored by an earlier attempt.
  pub order_reused: bool,
  pub cart_reconciled: bool,
  /// False when the selection was already gone or has changed since the order.
  pub selection_cleared: bool,
}

#[derive(Clone)]
pub struct OrderService {
  deps: SagaDeps,
  flows: Arc<Registry<AppError>>,
}

impl OrderService {
  pub fn new(deps: SagaDeps, flows: Arc<Registry<AppError>>) -> Self {
    Self { deps, flows }
  }

  async fn run_saga(&self, ctx: ContextData<PlaceOrderCtxData>, from: Option<&str>) -> Result<SagaOutcome> {
    let outcome = match from {
      Some(step) => self.flows.run_from(step, ctx.clone()).await?,
      None => self.flows.run(ctx.clone()).await?,
    };
    if outcome == PipelineResult::Stopped {
      return Err(AppError::Internal("order pipeline stopped early".to_string()));
    }
    let data = ctx.read().clone();
    let order = data
      .order
      .ok_or_else(|| AppError::Internal("order pipeline finished without an order".to_string()))?;
    Ok(SagaOutcome {
      order,
      order_reused: data.order_reused,
      cart_reconciled: data.cart_items_removed,
      selection_cleared: data.selection_cleared,
    })
  }

  /// Turns the owner's selection into an order, then reconciles the cart and
  /// clears the selection. Repeating the call for the same selection returns
  /// the same order.
  #[instrument(name = "OrderService::place_order", skip(self), err(Display))]
  pub async fn place_order(&self, owner: Uuid) -> Result<Order> {
    let ctx = ContextData::new(PlaceOrderCtxData::new(self.deps.clone(), owner));
    let outcome = self.run_saga(ctx, None).await?;
    info!(
      order_id = %outcome.order.id,
      reused = outcome.order_reused,
      cart_reconciled = outcome.cart_reconciled,
      selection_cleared = outcome.selection_cleared,
      "Order placed."
    );
    Ok(outcome.order)
  }

  /// Re-runs cart reconciliation and selection cleanup for a stored order.
  #[instrument(name = "OrderService::resume_cleanup", skip(self, actor), fields(actor = %actor.sub), err(Display))]
  pub async fn resume_cleanup(&self, actor: &Claims, order_id: Uuid) -> Result<SagaOutcome> {
    let order = self.load(order_id).await?;
    ensure_can_act_on(actor, order.owner)?;
    let ctx = ContextData::new(PlaceOrderCtxData::resuming(self.deps.clone(), order));
    let outcome = self.run_saga(ctx, Some(RESUME_STEP)).await?;
    info!(
      %order_id,
      cart_reconciled = outcome.cart_reconciled,
      selection_cleared = outcome.selection_cleared,
      "Order cleanup re-run."
    );
    Ok(outcome)
  }

  async fn load(&self, order_id: Uuid) -> Result<Order> {
    self
      .deps
      .orders
      .find(order_id)
      .await?
      .map(|found| found.doc)
      .ok_or(AppError::NotFound(Resource::Order(order_id)))
  }

  /// Deletes the order. Nothing is restocked and the cart is not restored.
  #[instrument(name = "OrderService::cancel_order", skip(self, actor), fields(actor = %actor.sub), err(Display))]
  pub async fn cancel_order(&self, actor: &Claims, order_id: Uuid) -> Result<()> {
    let found = self
      .deps
      .orders
      .find(order_id)
      .await?
      .ok_or(AppError::NotFound(Resource::Order(order_id)))?;
    if let Err(denied) = ensure_can_act_on(actor, found.doc.owner) {
      warn!(%order_id, "Cancellation by non-owner refused.");
      return Err(denied);
    }
    self
      .deps
      .orders
      .delete(order_id, Precondition::Version(found.version))
      .await?;
    info!(%order_id, "Order cancelled.");
    Ok(())
  }

  /// Newest first.
  #[instrument(name = "OrderService::list_orders", skip(self), err(Display))]
  pub async fn list_orders(&self, owner: Uuid) -> Result<Vec<Order>> {
    let mut orders = self.deps.orders.find_by_owner(owner).await?;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    Ok(orders)
  }

  #[instrument(name = "OrderService::get_order", skip(self, actor), err(Display))]
  pub async fn get_order(&self, actor: &Claims, order_id: Uuid) -> Result<Order> {
    let order = self.load(order_id).await?;
    ensure_can_act_on(actor, order.owner)?;
    Ok(order)
  }

  #[instrument(name = "OrderService::update_status", skip(self), err(Display))]
  pub async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<Order> {
    let written = read_modify_write(self.deps.orders.as_ref(), order_id, |current| {
      let mut order = current.ok_or(AppError::NotFound(Resource::Order(order_id)))?;
      if order.status == status {
        return Ok(Mutation::Unchanged(Some(order)));
      }
      order.status = status;
      order.updated_at = Utc::now();
      Ok(Mutation::Put(order))
    })
    .await?;

    written.ok_or(AppError::NotFound(Resource::Order(order_id)))
  }
}
