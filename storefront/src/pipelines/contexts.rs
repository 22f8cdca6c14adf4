// storefront/src/pipelines/contexts.rs

//! Data carried through pipeline runs. Handlers receive it wrapped in
//! `stepflow::ContextData`.

use crate::models::{Cart, CatalogItem, Order, SelectedItems};
use crate::services::cart_store::CartStore;
use crate::services::catalog::CatalogReader;
use crate::store::SharedCollection;
use std::sync::Arc;
use uuid::Uuid;

/// Store handles the order saga works against.
#[derive(Clone)]
pub struct SagaDeps {
  pub catalog: Arc<dyn CatalogReader>,
  pub carts: CartStore,
  pub selections: SharedCollection<SelectedItems>,
  pub orders: SharedCollection<Order>,
}

#[derive(Clone)]
pub struct PlaceOrderCtxData {
  pub deps: SagaDeps,
  pub owner: Uuid,

  pub selection: Option<SelectedItems>,
  /// Current catalog entries, in selection order.
  pub products: Vec<CatalogItem>,
  pub order: Option<Order>,
  /// The order was already stored by an earlier attempt.
  pub order_reused: bool,
  pub cart: Option<Cart>,
  pub cart_items_removed: bool,
  pub selection_cleared: bool,
}

impl PlaceOrderCtxData {
  pub fn new(deps: SagaDeps, owner: Uuid) -> Self {
    Self {
      deps,
      owner,
      selection: None,
      products: Vec::new(),
      order: None,
      order_reused: false,
      cart: None,
      cart_items_removed: false,
      selection_cleared: false,
    }
  }

  /// Context for re-running the cleanup steps of a stored order.
  pub fn resuming(deps: SagaDeps, order: Order) -> Self {
    let mut data = Self::new(deps, order.owner);
    data.order_reused = true;
    data.order = Some(order);
    data
  }
}
