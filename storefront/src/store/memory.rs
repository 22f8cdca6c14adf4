// storefront/src/store/memory.rs

use super::{Document, DocumentCollection, Precondition, StoreError, Versioned};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Process-local collection. Used when no database is configured and in tests.
pub struct MemoryCollection<D> {
  docs: RwLock<HashMap<Uuid, Versioned<D>>>,
}

impl<D: Document> MemoryCollection<D> {
  pub fn new() -> Self {
    Self {
      docs: RwLock::new(HashMap::new()),
    }
  }

  pub fn len(&self) -> usize {
    self.docs.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.docs.read().is_empty()
  }
}

impl<D: Document> Default for MemoryCollection<D> {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl<D: Document> DocumentCollection<D> for MemoryCollection<D> {
  async fn find(&self, key: Uuid) -> Result<Option<Versioned<D>>, StoreError> {
    Ok(self.docs.read().get(&key).cloned())
  }

  async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<D>, StoreError> {
    Ok(
      self
        .docs
        .read()
        .values()
        .filter(|entry| entry.doc.owner() == Some(owner))
        .map(|entry| entry.doc.clone())
        .collect(),
    )
  }

  async fn find_all(&self) -> Result<Vec<D>, StoreError> {
    Ok(self.docs.read().values().map(|entry| entry.doc.clone()).collect())
  }

  async fn put(&self, doc: &D, precondition: Precondition) -> Result<i64, StoreError> {
    let key = doc.key();
    let mut docs = self.docs.write();
    let current = docs.get(&key).map(|entry| entry.version);
    if !precondition.admits(current) {
      return Err(StoreError::Conflict {
        collection: D::COLLECTION,
        key,
      });
    }
    let version = current.map_or(1, |v| v + 1);
    docs.insert(
      key,
      Versioned {
        version,
        doc: doc.clone(),
      },
    );
    Ok(version)
  }

  async fn delete(&self, key: Uuid, precondition: Precondition) -> Result<bool, StoreError> {
    let mut docs = self.docs.write();
    let current = docs.get(&key).map(|entry| entry.version);
    match (precondition, current) {
      (Precondition::Version(_), None) => Err(StoreError::Conflict {
        collection: D::COLLECTION,
        key,
      }),
      (_, None) => Ok(false),
      (precondition, current) if !precondition.admits(current) => Err(StoreError::Conflict {
        collection: D::COLLECTION,
        key,
      }),
      _ => Ok(docs.remove(&key).is_some()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Cart;
  use chrono::Utc;

  #[tokio::test]
  async fn versions_advance_and_stale_writes_conflict() {
    let carts = MemoryCollection::<Cart>::new();
    let cart = Cart::new(Uuid::new_v4(), Utc::now());

    assert_eq!(carts.put(&cart, Precondition::Absent).await.unwrap(), 1);
    assert!(carts.put(&cart, Precondition::Absent).await.unwrap_err().is_conflict());
    assert_eq!(carts.put(&cart, Precondition::Version(1)).await.unwrap(), 2);
    assert!(carts
      .put(&cart, Precondition::Version(1))
      .await
      .unwrap_err()
      .is_conflict());
    assert_eq!(carts.find(cart.owner).await.unwrap().unwrap().version, 2);
  }

  #[tokio::test]
  async fn delete_respects_preconditions() {
    let carts = MemoryCollection::<Cart>::new();
    let cart = Cart::new(Uuid::new_v4(), Utc::now());
    carts.put(&cart, Precondition::Any).await.unwrap();

    assert!(carts
      .delete(cart.owner, Precondition::Version(9))
      .await
      .unwrap_err()
      .is_conflict());
    assert!(carts.delete(cart.owner, Precondition::Version(1)).await.unwrap());
    assert!(!carts.delete(cart.owner, Precondition::Any).await.unwrap());
    assert!(carts.is_empty());
  }
}
