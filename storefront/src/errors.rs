// storefront/src/errors.rs

use crate::store::StoreError;
use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;
use stepflow::FlowError;
use thiserror::Error;
use uuid::Uuid;

/// Why a bearer token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
  #[error("missing bearer token")]
  Missing,
  #[error("malformed token")]
  Malformed,
  #[error("token expired")]
  Expired,
  #[error("token signature is invalid")]
  BadSignature,
}

/// What a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
  Cart,
  SelectedItems,
  Order(Uuid),
  Product(Uuid),
  CartItem(Uuid),
  SelectedItem(Uuid),
  Booking(Uuid),
  User(Uuid),
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Resource::Cart => f.write_str("cart"),
      Resource::SelectedItems => f.write_str("selected items"),
      Resource::Order(id) => write!(f, "order {}", id),
      Resource::Product(id) => write!(f, "product {}", id),
      Resource::CartItem(id) => write!(f, "cart item for product {}", id),
      Resource::SelectedItem(id) => write!(f, "selected item for product {}", id),
      Resource::Booking(id) => write!(f, "booking {}", id),
      Resource::User(id) => write!(f, "user {}", id),
    }
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(#[from] AuthError),

  #[error("Invalid email or password")]
  InvalidCredentials,

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Not Found: {0}")]
  NotFound(Resource),

  #[error("Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app) => app,
      Err(err) => match err.downcast::<StoreError>() {
        Ok(store) => AppError::Store(store),
        Err(err) => AppError::Internal(err.to_string()),
      },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
      AppError::Store(_) | AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, %status, "Request rejected");
    }

    let message = match self {
      AppError::Validation(m) => m.clone(),
      AppError::Auth(e) => e.to_string(),
      AppError::InvalidCredentials => self.to_string(),
      AppError::Forbidden(m) => m.clone(),
      AppError::NotFound(resource) => format!("{} not found", resource),
      AppError::Store(StoreError::Conflict { .. }) => "Concurrent modification, please retry".to_string(),
      AppError::Store(_) => "Storage operation failed".to_string(),
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Workflow { source } => {
        tracing::error!(workflow_error_source = ?source, "Workflow error details");
        "Workflow processing error".to_string()
      }
      AppError::Internal(_) => "An internal error occurred".to_string(),
    };

    let mut builder = HttpResponse::build(status);
    if matches!(self, AppError::Auth(_)) {
      builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
    }
    builder.json(json!({ "error": message }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
