// tests/order_saga_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::errors::{AppError, Resource};
use chrono::Utc;
use storefront::models::{CatalogKind, OrderStatus, Role, SelectedItem, SelectedItems};
use storefront::store::{DocumentCollection, Precondition, StoreError};
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn order_uses_current_prices_and_cleans_up() {
  let h = harness();
  let p1 = h.product("P1", 1_000).await;
  let user = Uuid::new_v4();

  h.state.carts.add_item(user, p1.id, 2).await.unwrap();
  h.state.selections.add_item(user, p1.id, 2).await.unwrap();
  h.reprice(&p1, 1_200).await;

  let order = h.state.orders.place_order(user).await.unwrap();

  assert_eq!(order.owner, user);
  assert_eq!(order.total_price_cents, 2_400);
  assert_eq!(order.items.len(), 1);
  assert_eq!(order.items[0].unit_price_cents, 1_200);
  assert_eq!(order.items[0].quantity, 2);
  assert_eq!(order.status, OrderStatus::Pending);

  assert!(matches!(
    h.state.selections.get(user).await,
    Err(AppError::NotFound(Resource::SelectedItems))
  ));
  assert!(h.state.carts.find(user).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn second_run_finds_no_selection() {
  let h = harness();
  let p1 = h.product("Lamp", 4_500).await;
  let user = Uuid::new_v4();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();

  h.state.orders.place_order(user).await.unwrap();
  let err = h.state.orders.place_order(user).await.unwrap_err();

  assert!(matches!(err, AppError::NotFound(Resource::SelectedItems)));
  assert_eq!(h.orders.len(), 1);
}

#[tokio::test]
#[serial]
async fn cart_items_outside_the_order_are_kept() {
  let h = harness();
  let p1 = h.product("Chair", 9_000).await;
  let p2 = h.product("Table", 20_000).await;
  let user = Uuid::new_v4();

  h.state.carts.add_item(user, p1.id, 1).await.unwrap();
  h.state.carts.add_item(user, p2.id, 1).await.unwrap();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();

  h.state.orders.place_order(user).await.unwrap();

  let cart = h.state.carts.find(user).await.unwrap().unwrap();
  assert_eq!(cart.items.len(), 1);
  assert_eq!(cart.items[0].product_id, p2.id);
}

#[tokio::test]
#[serial]
async fn vanished_product_aborts_before_any_write() {
  let h = harness();
  let p1 = h.product("Rug", 7_000).await;
  let p2 = h.product("Vase", 1_500).await;
  let user = Uuid::new_v4();

  h.state.selections.add_item(user, p1.id, 1).await.unwrap();
  h.state.selections.add_item(user, p2.id, 1).await.unwrap();
  h.state.catalog.delete(CatalogKind::Product, p2.id).await.unwrap();

  let err = h.state.orders.place_order(user).await.unwrap_err();

  assert!(matches!(err, AppError::NotFound(Resource::Product(id)) if id == p2.id));
  assert_eq!(h.orders.len(), 0);
  assert_eq!(h.state.selections.get(user).await.unwrap().items.len(), 2);
}

#[tokio::test]
#[serial]
async fn a_stored_selection_naming_a_service_is_not_ordered() {
  let h = harness();
  let yoga = h.service("Yoga class", 5_000).await;
  let user = Uuid::new_v4();

  let mut stale = SelectedItems::new(user, Utc::now());
  stale.merge_item(
    SelectedItem {
      product_id: yoga.id,
      quantity: 2,
      unit_price_cents: yoga.price_cents,
      name: yoga.name.clone(),
      image_url: None,
    },
    Utc::now(),
  );
  h.selections.put(&stale, Precondition::Absent).await.unwrap();

  let err = h.state.orders.place_order(user).await.unwrap_err();

  assert!(matches!(err, AppError::NotFound(Resource::Product(id)) if id == yoga.id));
  assert_eq!(h.orders.len(), 0);
}

#[tokio::test]
#[serial]
async fn persist_failure_leaves_selection_and_cart_untouched() {
  let h = harness();
  let p1 = h.product("Shelf", 3_000).await;
  let user = Uuid::new_v4();
  h.state.carts.add_item(user, p1.id, 1).await.unwrap();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();

  h.orders.fail_puts(true);
  let err = h.state.orders.place_order(user).await.unwrap_err();

  assert!(matches!(err, AppError::Store(StoreError::Persist(_))));
  assert_eq!(h.orders.len(), 0);
  assert!(h.state.selections.get(user).await.is_ok());
  assert!(h.state.carts.find(user).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn items_selected_while_the_order_is_written_survive_cleanup() {
  let h = harness();
  let p1 = h.product("Teapot", 3_500).await;
  let p2 = h.product("Cups", 1_200).await;
  let user = Uuid::new_v4();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();

  let selections = h.state.selections.clone();
  let late_pick = p2.id;
  h.orders.after_next_put(Box::pin(async move {
    selections.add_item(user, late_pick, 3).await.unwrap();
  }));
  let order = h.state.orders.place_order(user).await.unwrap();

  assert_eq!(order.items.len(), 1);
  assert_eq!(order.items[0].product_id, p1.id);
  let left = h.state.selections.get(user).await.unwrap();
  assert!(left.items.iter().any(|item| item.product_id == p2.id && item.quantity == 3));
}

#[tokio::test]
#[serial]
async fn rerun_after_failed_cleanup_reuses_the_stored_order() {
  let h = harness();
  let p1 = h.product("Clock", 2_200).await;
  let user = Uuid::new_v4();
  h.state.carts.add_item(user, p1.id, 1).await.unwrap();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();

  h.selections.fail_deletes(true);
  let err = h.state.orders.place_order(user).await.unwrap_err();
  assert!(matches!(err, AppError::Store(_)));
  assert_eq!(h.orders.len(), 1);
  let stored = h.state.orders.list_orders(user).await.unwrap().remove(0);

  h.selections.fail_deletes(false);
  let order = h.state.orders.place_order(user).await.unwrap();

  assert_eq!(order.id, stored.id);
  assert_eq!(h.orders.len(), 1);
  assert!(h.state.selections.get(user).await.is_err());
  assert!(h.state.carts.find(user).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn resume_cleanup_finishes_a_stranded_order() {
  let h = harness();
  let p1 = h.product("Mirror", 5_000).await;
  let user = Uuid::new_v4();
  h.state.carts.add_item(user, p1.id, 1).await.unwrap();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();

  h.carts.fail_puts(true);
  h.carts.fail_deletes(true);
  assert!(h.state.orders.place_order(user).await.is_err());
  let stranded = h.state.orders.list_orders(user).await.unwrap().remove(0);
  assert!(h.state.carts.find(user).await.unwrap().is_some());

  h.carts.fail_puts(false);
  h.carts.fail_deletes(false);
  let outcome = h
    .state
    .orders
    .resume_cleanup(&claims(user, Role::Customer), stranded.id)
    .await
    .unwrap();

  assert_eq!(outcome.order.id, stranded.id);
  assert!(outcome.order_reused);
  assert!(outcome.cart_reconciled);
  assert!(outcome.selection_cleared);
  assert!(h.state.carts.find(user).await.unwrap().is_none());
  assert!(h.state.selections.get(user).await.is_err());
}

#[tokio::test]
#[serial]
async fn resume_cleanup_keeps_a_newer_selection() {
  let h = harness();
  let p1 = h.product("Pillow", 1_100).await;
  let p2 = h.product("Blanket", 3_300).await;
  let user = Uuid::new_v4();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();

  h.selections.fail_deletes(true);
  assert!(h.state.orders.place_order(user).await.is_err());
  h.selections.fail_deletes(false);
  let stranded = h.state.orders.list_orders(user).await.unwrap().remove(0);

  h.state.selections.add_item(user, p2.id, 1).await.unwrap();
  let outcome = h
    .state
    .orders
    .resume_cleanup(&claims(user, Role::Customer), stranded.id)
    .await
    .unwrap();

  assert!(!outcome.selection_cleared);
  assert!(!outcome.cart_reconciled);
  assert_eq!(h.state.selections.get(user).await.unwrap().items.len(), 2);
}

#[tokio::test]
#[serial]
async fn resume_cleanup_is_limited_to_owner_and_admin() {
  let h = harness();
  let p1 = h.product("Frame", 900).await;
  let user = Uuid::new_v4();
  h.state.selections.add_item(user, p1.id, 1).await.unwrap();
  let order = h.state.orders.place_order(user).await.unwrap();

  let stranger = claims(Uuid::new_v4(), Role::Staff);
  assert!(matches!(
    h.state.orders.resume_cleanup(&stranger, order.id).await,
    Err(AppError::Forbidden(_))
  ));
  assert!(h
    .state
    .orders
    .resume_cleanup(&claims(Uuid::new_v4(), Role::Admin), order.id)
    .await
    .is_ok());
}

#[tokio::test]
#[serial]
async fn cancellation_is_owner_or_admin_only() {
  let h = harness();
  let p1 = h.product("Candle", 400).await;
  let alice = Uuid::new_v4();
  h.state.selections.add_item(alice, p1.id, 1).await.unwrap();
  let order = h.state.orders.place_order(alice).await.unwrap();

  let bob = claims(Uuid::new_v4(), Role::Customer);
  assert!(matches!(
    h.state.orders.cancel_order(&bob, order.id).await,
    Err(AppError::Forbidden(_))
  ));
  assert_eq!(h.orders.len(), 1);

  h.state
    .orders
    .cancel_order(&claims(Uuid::new_v4(), Role::Admin), order.id)
    .await
    .unwrap();
  assert_eq!(h.orders.len(), 0);
  assert!(matches!(
    h.state.orders.cancel_order(&claims(alice, Role::Customer), order.id).await,
    Err(AppError::NotFound(Resource::Order(_)))
  ));
}

#[tokio::test]
#[serial]
async fn orders_list_newest_first_and_status_updates() {
  let h = harness();
  let p1 = h.product("Soap", 300).await;
  let user = Uuid::new_v4();

  h.state.selections.add_item(user, p1.id, 1).await.unwrap();
  let first = h.state.orders.place_order(user).await.unwrap();
  h.state.selections.add_item(user, p1.id, 2).await.unwrap();
  let second = h.state.orders.place_order(user).await.unwrap();
  assert_ne!(first.id, second.id);

  let listed: Vec<Uuid> = h.state.orders.list_orders(user).await.unwrap().iter().map(|o| o.id).collect();
  assert_eq!(listed.len(), 2);
  if second.created_at > first.created_at {
    assert_eq!(listed[0], second.id);
  }

  let updated = h.state.orders.update_status(first.id, OrderStatus::Shipped).await.unwrap();
  assert_eq!(updated.status, OrderStatus::Shipped);
  assert_eq!(
    h.state.orders.get_order(&claims(user, Role::Customer), first.id).await.unwrap().status,
    OrderStatus::Shipped
  );
}
