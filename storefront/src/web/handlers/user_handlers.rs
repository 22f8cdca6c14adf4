// storefront/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::auth_service::UserUpdate;
use crate::state::AppState;
use crate::web::gate::{AdminTier, Authorized, CustomerTier};

#[instrument(name = "handler::list_users", skip_all, fields(user_id = %user.user_id()))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  user: Authorized<AdminTier>,
) -> Result<HttpResponse, AppError> {
  let users = app_state.accounts.list_users().await?;
  Ok(HttpResponse::Ok().json(json!({
    "count": users.len(),
    "users": users
  })))
}

#[instrument(name = "handler::get_user", skip(app_state, user), fields(user_id = %user.user_id()))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  user: Authorized<CustomerTier>,
) -> Result<HttpResponse, AppError> {
  let found = app_state.accounts.get_user(&user.claims, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(found))
}

/// The path names the account to edit; who is editing comes from the token.
#[instrument(name = "handler::update_user", skip(app_state, payload, user), fields(user_id = %user.user_id()))]
pub async fn update_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UserUpdate>,
  user: Authorized<AdminTier>,
) -> Result<HttpResponse, AppError> {
  let updated = app_state
    .accounts
    .update_user(&user.claims, path.into_inner(), payload.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_user", skip(app_state, user), fields(user_id = %user.user_id()))]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  user: Authorized<AdminTier>,
) -> Result<HttpResponse, AppError> {
  let target = path.into_inner();
  app_state.accounts.delete_user(&user.claims, target).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": "User deleted.",
    "user_id": target
  })))
}
