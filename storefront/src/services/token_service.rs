// storefront/src/services/token_service.rs

//! Issues and verifies HS256 session tokens.
//!
//! Access and refresh tokens are signed with different secrets, so one kind
//! never verifies as the other.

use crate::config::AppConfig;
use crate::errors::{AppError, AuthError};
use crate::models::Role;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

/// What a verified token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub role: Role,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Access,
  Refresh,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
  pub access_token: String,
  pub refresh_token: String,
  pub token_type: &'static str,
  pub expires_in: u64,
}

struct KeyPair {
  encoding: EncodingKey,
  decoding: DecodingKey,
}

impl KeyPair {
  fn from_secret(secret: &str) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
    }
  }
}

pub struct TokenService {
  access: KeyPair,
  refresh: KeyPair,
  validation: Validation,
  access_ttl: Duration,
  refresh_ttl: Duration,
}

impl TokenService {
  pub fn new(access_secret: &str, refresh_secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, AppError> {
    if access_secret.is_empty() || refresh_secret.is_empty() {
      return Err(AppError::Config("token secrets must not be empty".to_string()));
    }
    if access_secret == refresh_secret {
      return Err(AppError::Config("access and refresh secrets must differ".to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    Ok(Self {
      access: KeyPair::from_secret(access_secret),
      refresh: KeyPair::from_secret(refresh_secret),
      validation,
      access_ttl,
      refresh_ttl,
    })
  }

  pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
    Self::new(
      &config.jwt_secret,
      &config.jwt_refresh_secret,
      config.access_token_ttl,
      config.refresh_token_ttl,
    )
  }

  fn keys(&self, kind: TokenKind) -> &KeyPair {
    match kind {
      TokenKind::Access => &self.access,
      TokenKind::Refresh => &self.refresh,
    }
  }

  pub fn ttl(&self, kind: TokenKind) -> Duration {
    match kind {
      TokenKind::Access => self.access_ttl,
      TokenKind::Refresh => self.refresh_ttl,
    }
  }

  pub fn issue(&self, kind: TokenKind, user_id: Uuid, role: Role, ttl: Duration) -> Result<String, AppError> {
    self.issue_at(kind, user_id, role, Utc::now(), ttl)
  }

  /// Like [`issue`](Self::issue) with an explicit issue time.
  pub fn issue_at(
    &self,
    kind: TokenKind,
    user_id: Uuid,
    role: Role,
    issued_at: DateTime<Utc>,
    ttl: Duration,
  ) -> Result<String, AppError> {
    let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| AppError::Config("token lifetime too large".to_string()))?;
    let iat = issued_at.timestamp();
    let claims = Claims {
      sub: user_id,
      role,
      iat,
      exp: iat.saturating_add(ttl_secs),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.keys(kind).encoding)
      .map_err(|e| AppError::Internal(format!("jwt encode: {}", e)))
  }

  pub fn verify(&self, kind: TokenKind, token: &str) -> Result<Claims, AuthError> {
    jsonwebtoken::decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| {
        let reason = match e.kind() {
          ErrorKind::ExpiredSignature => AuthError::Expired,
          ErrorKind::InvalidSignature => AuthError::BadSignature,
          _ => AuthError::Malformed,
        };
        debug!(?kind, error = %e, ?reason, "Token rejected.");
        reason
      })
  }

  #[instrument(name = "TokenService::issue_pair", skip(self), err(Display))]
  pub fn issue_pair(&self, user_id: Uuid, role: Role) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
      access_token: self.issue(TokenKind::Access, user_id, role, self.access_ttl)?,
      refresh_token: self.issue(TokenKind::Refresh, user_id, role, self.refresh_ttl)?,
      token_type: "Bearer",
      expires_in: self.access_ttl.as_secs(),
    })
  }

  /// Mints a new access token for the subject and role of a valid refresh token.
  #[instrument(name = "TokenService::refresh", skip_all, err(Display))]
  pub fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
    let claims = self.verify(TokenKind::Refresh, refresh_token)?;
    self.issue(TokenKind::Access, claims.sub, claims.role, self.access_ttl)
  }
}
