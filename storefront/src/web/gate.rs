// storefront/src/web/gate.rs

//! Bearer-token gate. Handlers name the tier they require in their
//! signature, e.g. `user: Authorized<CustomerTier>`, and receive verified
//! claims.

use crate::errors::{AppError, AuthError};
use crate::models::Role;
use crate::services::token_service::{Claims, TokenKind, TokenService};
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use std::marker::PhantomData;
use tracing::warn;
use uuid::Uuid;

pub trait RequiredRole {
  const ROLE: Role;
}

pub struct AdminTier;
pub struct StaffTier;
pub struct CustomerTier;

impl RequiredRole for AdminTier {
  const ROLE: Role = Role::Admin;
}

impl RequiredRole for StaffTier {
  const ROLE: Role = Role::Staff;
}

impl RequiredRole for CustomerTier {
  const ROLE: Role = Role::Customer;
}

/// Takes the token out of an `Authorization` value. The `Bearer` scheme
/// word is optional and matched case-insensitively, but must stand alone.
fn bearer_token(value: &str) -> &str {
  let value = value.trim();
  match value.split_once(char::is_whitespace) {
    Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim_start(),
    _ if value.eq_ignore_ascii_case("bearer") => "",
    _ => value,
  }
}

/// Verifies the access token in `header_value` and checks its role against `required`.
pub fn authorize(header_value: Option<&str>, tokens: &TokenService, required: Role) -> Result<Claims, AppError> {
  let raw = header_value.ok_or(AuthError::Missing)?;
  let token = bearer_token(raw);
  if token.is_empty() {
    return Err(AuthError::Malformed.into());
  }

  let claims = tokens.verify(TokenKind::Access, token)?;
  if !claims.role.satisfies(required) {
    warn!(user_id = %claims.sub, role = %claims.role, %required, "Role does not meet route requirement.");
    return Err(AppError::Forbidden(format!("requires {} privileges", required)));
  }
  Ok(claims)
}

pub struct Authorized<T: RequiredRole> {
  pub claims: Claims,
  _tier: PhantomData<T>,
}

impl<T: RequiredRole> Authorized<T> {
  pub fn user_id(&self) -> Uuid {
    self.claims.sub
  }
}

impl<T: RequiredRole> FromRequest for Authorized<T> {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("application state is not configured".to_string())));
    };

    let header_value = match req.headers().get(header::AUTHORIZATION) {
      None => None,
      Some(value) => match value.to_str() {
        Ok(text) => Some(text),
        Err(_) => return ready(Err(AuthError::Malformed.into())),
      },
    };

    ready(authorize(header_value, &state.tokens, T::ROLE).map(|claims| Authorized {
      claims,
      _tier: PhantomData,
    }))
  }
}
