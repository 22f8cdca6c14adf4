// storefront/src/store/users.rs

use super::StoreError;
use crate::models::User;
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

const USERS: &str = "users";

#[async_trait]
pub trait UserRepository: Send + Sync {
  /// `email` must already be normalized to lowercase.
  async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

  /// Oldest account first.
  async fn list(&self) -> Result<Vec<User>, StoreError>;

  /// Fails with `Conflict` when the e-mail is taken.
  async fn insert(&self, user: &User) -> Result<(), StoreError>;

  /// Replaces the stored account with the same id. `Ok(false)` when there is
  /// none; `Conflict` when the new e-mail belongs to another account.
  async fn update(&self, user: &User) -> Result<bool, StoreError>;

  async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

fn email_taken(id: Uuid) -> StoreError {
  StoreError::Conflict {
    collection: USERS,
    key: id,
  }
}

#[derive(Default)]
pub struct MemoryUserRepository {
  users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
  async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
    Ok(self.users.read().values().find(|user| user.email == email).cloned())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
    Ok(self.users.read().get(&id).cloned())
  }

  async fn list(&self) -> Result<Vec<User>, StoreError> {
    let mut users: Vec<User> = self.users.read().values().cloned().collect();
    users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(users)
  }

  async fn insert(&self, user: &User) -> Result<(), StoreError> {
    let mut users = self.users.write();
    if users.contains_key(&user.id) || users.values().any(|existing| existing.email == user.email) {
      return Err(email_taken(user.id));
    }
    users.insert(user.id, user.clone());
    Ok(())
  }

  async fn update(&self, user: &User) -> Result<bool, StoreError> {
    let mut users = self.users.write();
    if !users.contains_key(&user.id) {
      return Ok(false);
    }
    if users.values().any(|other| other.id != user.id && other.email == user.email) {
      return Err(email_taken(user.id));
    }
    users.insert(user.id, user.clone());
    Ok(true)
  }

  async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
    Ok(self.users.write().remove(&id).is_some())
  }
}

pub struct PgUserRepository {
  pool: PgPool,
  timeout: Duration,
}

impl PgUserRepository {
  pub fn new(pool: PgPool, timeout: Duration) -> Self {
    Self { pool, timeout }
  }

  async fn bounded<T>(
    &self,
    op: &'static str,
    fut: impl std::future::Future<Output = Result<T, sqlx::Error>>,
  ) -> Result<T, StoreError> {
    tokio::time::timeout(self.timeout, fut)
      .await
      .map_err(|_| StoreError::Timeout {
        op,
        collection: USERS,
        after: self.timeout,
      })?
      .map_err(StoreError::from)
  }

  /// Like `bounded`, but a unique-constraint violation means the e-mail is taken.
  async fn unique<T>(
    &self,
    op: &'static str,
    id: Uuid,
    fut: impl std::future::Future<Output = Result<T, sqlx::Error>>,
  ) -> Result<T, StoreError> {
    let outcome = tokio::time::timeout(self.timeout, fut)
      .await
      .map_err(|_| StoreError::Timeout {
        op,
        collection: USERS,
        after: self.timeout,
      })?;
    match outcome {
      Ok(value) => Ok(value),
      Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(email_taken(id)),
      Err(other) => Err(other.into()),
    }
  }
}

#[async_trait]
impl UserRepository for PgUserRepository {
  #[instrument(name = "PgUserRepository::find_by_email", skip(self, email), err(Display))]
  async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
    self
      .bounded(
        "find_by_email",
        sqlx::query_as::<_, User>(
          "SELECT id, email, password_hash, role, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool),
      )
      .await
  }

  #[instrument(name = "PgUserRepository::find_by_id", skip(self), err(Display))]
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
    self
      .bounded(
        "find_by_id",
        sqlx::query_as::<_, User>(
          "SELECT id, email, password_hash, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool),
      )
      .await
  }

  #[instrument(name = "PgUserRepository::list", skip(self), err(Display))]
  async fn list(&self) -> Result<Vec<User>, StoreError> {
    self
      .bounded(
        "list",
        sqlx::query_as::<_, User>(
          "SELECT id, email, password_hash, role, created_at, updated_at FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool),
      )
      .await
  }

  #[instrument(name = "PgUserRepository::insert", skip(self, user), fields(user_id = %user.id), err(Display))]
  async fn insert(&self, user: &User) -> Result<(), StoreError> {
    let outcome = self
      .unique(
        "insert",
        user.id,
        sqlx::query(
          "INSERT INTO users (id, email, password_hash, role, created_at, updated_at) \
           VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(i16::from(user.role.ordinal()))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool),
      )
      .await?;
    debug!(rows = outcome.rows_affected(), "User inserted.");
    Ok(())
  }

  #[instrument(name = "PgUserRepository::update", skip(self, user), fields(user_id = %user.id), err(Display))]
  async fn update(&self, user: &User) -> Result<bool, StoreError> {
    let outcome = self
      .unique(
        "update",
        user.id,
        sqlx::query(
          "UPDATE users SET email = $2, password_hash = $3, role = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(i16::from(user.role.ordinal()))
        .bind(user.updated_at)
        .execute(&self.pool),
      )
      .await?;
    Ok(outcome.rows_affected() > 0)
  }

  #[instrument(name = "PgUserRepository::delete", skip(self), err(Display))]
  async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
    let outcome = self
      .bounded(
        "delete",
        sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool),
      )
      .await?;
    Ok(outcome.rows_affected() > 0)
  }
}
