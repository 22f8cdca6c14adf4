// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::gate::{Authorized, CustomerTier};

#[derive(Deserialize, Debug)]
pub struct CartItemPayload {
  pub product_id: Uuid,
  pub quantity: u32,
}

#[derive(Deserialize, Debug)]
pub struct ProductRefPayload {
  pub product_id: Uuid,
}

#[instrument(name = "handler::get_cart", skip_all, fields(user_id = %user.user_id()))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let view = app_state.carts.get_cart(user.user_id()).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, payload, user),
  fields(user_id = %user.user_id(), product_id = %payload.product_id, quantity = payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CartItemPayload>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state
    .carts
    .add_item(user.user_id(), payload.product_id, payload.quantity)
    .await?;
  info!(lines = cart.items.len(), "Item added to cart.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Item added to cart successfully.",
    "cart": cart
  })))
}

#[instrument(
  name = "handler::update_cart",
  skip(app_state, payload, user),
  fields(user_id = %user.user_id(), product_id = %payload.product_id)
)]
pub async fn update_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CartItemPayload>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let cart = app_state
    .carts
    .set_quantity(user.user_id(), payload.product_id, payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": "Cart item updated.",
    "cart": cart
  })))
}

#[instrument(
  name = "handler::remove_from_cart",
  skip(app_state, payload, user),
  fields(user_id = %user.user_id(), product_id = %payload.product_id)
)]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ProductRefPayload>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let remaining = app_state.carts.remove_item(user.user_id(), payload.product_id).await?;
  let message = if remaining.is_some() {
    "Item removed from cart."
  } else {
    "Item removed, cart is now empty."
  };
  Ok(HttpResponse::Ok().json(json!({
    "message": message,
    "cart": remaining
  })))
}
