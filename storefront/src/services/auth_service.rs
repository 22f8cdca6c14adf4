// storefront/src/services/auth_service.rs

//! Password hashing, the account lifecycle (register, login, refresh) and
//! Admin-tier account administration.

use crate::errors::{AppError, Resource, Result};
use crate::models::{Role, User};
use crate::services::orders::ensure_can_act_on;
use crate::services::token_service::{Claims, TokenPair, TokenService};
use crate::store::{StoreError, UserRepository};
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hashes a plain-text password with Argon2 and a fresh random salt.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// `Ok(false)` on mismatch; errors only for an unreadable stored hash.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool> {
  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other) => Err(AppError::Internal(format!("Password verification process failed: {}", other))),
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
  pub email: String,
  pub password: String,
}

/// Fields an administrator may change on an account. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub password: Option<String>,
  #[serde(default)]
  pub role: Option<Role>,
}

#[derive(Clone)]
pub struct AccountService {
  users: Arc<dyn UserRepository>,
  tokens: Arc<TokenService>,
}

impl AccountService {
  pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
    Self { users, tokens }
  }

  fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let well_formed = match email.split_once('@') {
      Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
      None => false,
    };
    if !well_formed {
      return Err(AppError::Validation("A valid email is required.".to_string()));
    }
    Ok(email)
  }

  fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(AppError::Validation(format!(
        "Password must be at least {} characters.",
        MIN_PASSWORD_LEN
      )));
    }
    Ok(())
  }

  async fn create_user(&self, email: String, password: &str, role: Role) -> Result<User> {
    let now = Utc::now();
    let user = User {
      id: Uuid::new_v4(),
      email,
      password_hash: hash_password(password)?,
      role,
      created_at: now,
      updated_at: now,
    };
    match self.users.insert(&user).await {
      Ok(()) => Ok(user),
      Err(StoreError::Conflict { .. }) => Err(AppError::Validation("Email is already registered.".to_string())),
      Err(other) => Err(other.into()),
    }
  }

  /// Self-registration always yields a Customer.
  #[instrument(name = "AccountService::register", skip(self, credentials), err(Display))]
  pub async fn register(&self, credentials: Credentials) -> Result<User> {
    let email = Self::normalize_email(&credentials.email)?;
    Self::check_password(&credentials.password)?;
    if self.users.find_by_email(&email).await?.is_some() {
      return Err(AppError::Validation("Email is already registered.".to_string()));
    }

    let user = self.create_user(email, &credentials.password, Role::Customer).await?;
    info!(user_id = %user.id, "User registered.");
    Ok(user)
  }

  #[instrument(name = "AccountService::login", skip(self, credentials), err(Display))]
  pub async fn login(&self, credentials: Credentials) -> Result<(User, TokenPair)> {
    let email = credentials.email.trim().to_lowercase();
    let user = match self.users.find_by_email(&email).await? {
      Some(user) => user,
      None => {
        debug!("Login for unknown email.");
        return Err(AppError::InvalidCredentials);
      }
    };
    if !verify_password(&user.password_hash, &credentials.password)? {
      return Err(AppError::InvalidCredentials);
    }

    let pair = self.tokens.issue_pair(user.id, user.role)?;
    info!(user_id = %user.id, role = %user.role, "User logged in.");
    Ok((user, pair))
  }

  pub fn refresh(&self, refresh_token: &str) -> Result<String> {
    self.tokens.refresh(refresh_token)
  }

  /// Creates the configured Admin account unless the email already exists.
  #[instrument(name = "AccountService::ensure_bootstrap_admin", skip(self, password), err(Display))]
  pub async fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> Result<()> {
    let email = Self::normalize_email(email)?;
    if let Some(existing) = self.users.find_by_email(&email).await? {
      if existing.role != Role::Admin {
        warn!(user_id = %existing.id, role = %existing.role, "Bootstrap admin email belongs to a non-admin account.");
      }
      return Ok(());
    }
    let admin = self.create_user(email, password, Role::Admin).await?;
    info!(user_id = %admin.id, "Bootstrap admin created.");
    Ok(())
  }

  async fn load_user(&self, id: Uuid) -> Result<User> {
    self
      .users
      .find_by_id(id)
      .await?
      .ok_or(AppError::NotFound(Resource::User(id)))
  }

  /// Every account, oldest first.
  #[instrument(name = "AccountService::list_users", skip(self), err(Display))]
  pub async fn list_users(&self) -> Result<Vec<User>> {
    Ok(self.users.list().await?)
  }

  /// An account is visible to its holder and to Admin-tier users.
  #[instrument(name = "AccountService::get_user", skip(self, actor), fields(actor = %actor.sub), err(Display))]
  pub async fn get_user(&self, actor: &Claims, id: Uuid) -> Result<User> {
    ensure_can_act_on(actor, id)?;
    self.load_user(id).await
  }

  /// Applies `changes` to the account `target`. The actor comes from the
  /// verified claims; `target` is only the account being edited. An actor
  /// cannot change their own role.
  #[instrument(name = "AccountService::update_user", skip(self, actor, changes), fields(actor = %actor.sub), err(Display))]
  pub async fn update_user(&self, actor: &Claims, target: Uuid, changes: UserUpdate) -> Result<User> {
    let mut user = self.load_user(target).await?;

    if let Some(role) = changes.role {
      if actor.sub == target && role != user.role {
        return Err(AppError::Validation("You cannot change your own role.".to_string()));
      }
      user.role = role;
    }
    if let Some(email) = changes.email {
      user.email = Self::normalize_email(&email)?;
    }
    if let Some(password) = changes.password {
      Self::check_password(&password)?;
      user.password_hash = hash_password(&password)?;
    }
    user.updated_at = Utc::now();

    match self.users.update(&user).await {
      Ok(true) => {}
      Ok(false) => return Err(AppError::NotFound(Resource::User(target))),
      Err(StoreError::Conflict { .. }) => {
        return Err(AppError::Validation("Email is already registered.".to_string()))
      }
      Err(other) => return Err(other.into()),
    }
    info!(user_id = %target, role = %user.role, "User updated.");
    Ok(user)
  }

  /// Removes the account `target`. Admins cannot delete their own account.
  #[instrument(name = "AccountService::delete_user", skip(self, actor), fields(actor = %actor.sub), err(Display))]
  pub async fn delete_user(&self, actor: &Claims, target: Uuid) -> Result<()> {
    if actor.sub == target {
      return Err(AppError::Validation("You cannot delete your own account.".to_string()));
    }
    if !self.users.delete(target).await? {
      return Err(AppError::NotFound(Resource::User(target)));
    }
    info!(user_id = %target, "User deleted.");
    Ok(())
  }
}
