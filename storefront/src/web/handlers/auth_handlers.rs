// storefront/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::auth_service::Credentials;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct RefreshPayload {
  pub refresh_token: String,
}

#[instrument(name = "handler::register", skip_all)]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
  let user = app_state.accounts.register(payload.into_inner()).await?;
  info!(user_id = %user.id, "Registration complete.");
  Ok(HttpResponse::Created().json(json!({
    "message": "User registered successfully.",
    "user": user
  })))
}

#[instrument(name = "handler::login", skip_all)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
  let (user, tokens) = app_state.accounts.login(payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "user": user,
    "access_token": tokens.access_token,
    "refresh_token": tokens.refresh_token,
    "token_type": tokens.token_type,
    "expires_in": tokens.expires_in
  })))
}

#[instrument(name = "handler::refresh", skip_all)]
pub async fn refresh_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RefreshPayload>,
) -> Result<HttpResponse, AppError> {
  let access_token = app_state.accounts.refresh(&payload.refresh_token)?;
  Ok(HttpResponse::Ok().json(json!({
    "access_token": access_token,
    "token_type": "Bearer",
    "expires_in": app_state.config.access_token_ttl.as_secs()
  })))
}
