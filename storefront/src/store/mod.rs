// storefront/src/store/mod.rs

//! Per-user documents behind a versioned, compare-and-set interface.
//!
//! Every write names a [`Precondition`]; a write whose precondition does not
//! hold fails with [`StoreError::Conflict`] and leaves the stored document
//! untouched.

pub mod memory;
pub mod postgres;
pub mod users;

use crate::models::{Cart, CatalogItem, Order, SelectedItems, ServiceBooking};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryCollection;
pub use postgres::PgCollection;
pub use users::{MemoryUserRepository, PgUserRepository, UserRepository};

pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
  const COLLECTION: &'static str;

  fn key(&self) -> Uuid;

  /// Owner used for per-user listings; `None` for shared documents.
  fn owner(&self) -> Option<Uuid> {
    None
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<D> {
  pub version: i64,
  pub doc: D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
  /// Unconditional write.
  Any,
  /// The key must not exist yet.
  Absent,
  /// The stored version must equal this one.
  Version(i64),
}

impl Precondition {
  /// `current` is the stored version, if the key exists.
  pub fn admits(self, current: Option<i64>) -> bool {
    match (self, current) {
      (Precondition::Any, _) => true,
      (Precondition::Absent, None) => true,
      (Precondition::Absent, Some(_)) => false,
      (Precondition::Version(expected), Some(found)) => expected == found,
      (Precondition::Version(_), None) => false,
    }
  }

  /// Precondition matching what a caller last read.
  pub fn matching(read: Option<i64>) -> Self {
    match read {
      Some(version) => Precondition::Version(version),
      None => Precondition::Absent,
    }
  }
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store temporarily unavailable: {0}")]
  Transient(String),

  #[error("store operation failed: {0}")]
  Persist(String),

  #[error("{op} on '{collection}' timed out after {after:?}")]
  Timeout {
    op: &'static str,
    collection: &'static str,
    after: Duration,
  },

  #[error("concurrent modification of '{collection}' document {key}")]
  Conflict { collection: &'static str, key: Uuid },
}

impl StoreError {
  pub fn is_conflict(&self) -> bool {
    matches!(self, StoreError::Conflict { .. })
  }
}

impl From<sqlx::Error> for StoreError {
  fn from(err: sqlx::Error) -> Self {
    match err {
      sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
        StoreError::Transient(err.to_string())
      }
      sqlx::Error::Io(io) => StoreError::Transient(io.to_string()),
      other => StoreError::Persist(other.to_string()),
    }
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(err: serde_json::Error) -> Self {
    StoreError::Persist(format!("document encoding: {}", err))
  }
}

#[async_trait]
pub trait DocumentCollection<D: Document>: Send + Sync {
  async fn find(&self, key: Uuid) -> Result<Option<Versioned<D>>, StoreError>;

  async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<D>, StoreError>;

  async fn find_all(&self) -> Result<Vec<D>, StoreError>;

  /// Stores `doc` under `doc.key()` and returns the new version.
  async fn put(&self, doc: &D, precondition: Precondition) -> Result<i64, StoreError>;

  /// Returns whether a document was removed.
  async fn delete(&self, key: Uuid, precondition: Precondition) -> Result<bool, StoreError>;
}

pub type SharedCollection<D> = Arc<dyn DocumentCollection<D>>;

/// All collections the storefront works with.
#[derive(Clone)]
pub struct Stores {
  pub carts: SharedCollection<Cart>,
  pub selections: SharedCollection<SelectedItems>,
  pub orders: SharedCollection<Order>,
  pub catalog: SharedCollection<CatalogItem>,
  pub bookings: SharedCollection<ServiceBooking>,
  pub users: Arc<dyn UserRepository>,
}

impl Stores {
  pub fn in_memory() -> Self {
    Self {
      carts: Arc::new(MemoryCollection::<Cart>::new()),
      selections: Arc::new(MemoryCollection::<SelectedItems>::new()),
      orders: Arc::new(MemoryCollection::<Order>::new()),
      catalog: Arc::new(MemoryCollection::<CatalogItem>::new()),
      bookings: Arc::new(MemoryCollection::<ServiceBooking>::new()),
      users: Arc::new(MemoryUserRepository::new()),
    }
  }

  /// Every call is bounded by `timeout`.
  pub fn postgres(pool: PgPool, timeout: Duration) -> Self {
    Self {
      carts: Arc::new(PgCollection::<Cart>::new(pool.clone(), timeout)),
      selections: Arc::new(PgCollection::<SelectedItems>::new(pool.clone(), timeout)),
      orders: Arc::new(PgCollection::<Order>::new(pool.clone(), timeout)),
      catalog: Arc::new(PgCollection::<CatalogItem>::new(pool.clone(), timeout)),
      bookings: Arc::new(PgCollection::<ServiceBooking>::new(pool.clone(), timeout)),
      users: Arc::new(PgUserRepository::new(pool, timeout)),
    }
  }
}
