// storefront/src/services/mod.rs

pub mod auth_service;
pub mod bookings;
pub mod cart_store;
pub mod catalog;
pub mod orders;
pub mod selection_store;
pub mod token_service;

use crate::errors::AppError;
use crate::store::{Document, DocumentCollection, Precondition, StoreError};
use tracing::debug;
use uuid::Uuid;

/// Attempts per read-modify-write before a conflict is surfaced to the caller.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Outcome of a mutation closure.
pub enum Mutation<D> {
  Put(D),
  Delete,
  /// Nothing to write; the value is returned as-is.
  Unchanged(Option<D>),
}

/// Reads the document at `key`, lets `mutate` decide what to store, and
/// writes it back conditioned on the version that was read. A concurrent
/// writer causes a re-read and a fresh call to `mutate`.
///
/// Returns the document as written (`None` after a delete).
pub async fn read_modify_write<D, F>(
  coll: &dyn DocumentCollection<D>,
  key: Uuid,
  mut mutate: F,
) -> Result<Option<D>, AppError>
where
  D: Document,
  F: FnMut(Option<D>) -> Result<Mutation<D>, AppError> + Send,
{
  let mut attempt = 1;
  loop {
    let current = coll.find(key).await?;
    let read_version = current.as_ref().map(|v| v.version);
    let precondition = Precondition::matching(read_version);

    let written = match mutate(current.map(|v| v.doc))? {
      Mutation::Unchanged(doc) => return Ok(doc),
      Mutation::Put(doc) => coll.put(&doc, precondition).await.map(|_| Some(doc)),
      Mutation::Delete if read_version.is_none() => return Ok(None),
      Mutation::Delete => coll.delete(key, precondition).await.map(|_| None),
    };

    match written {
      Ok(doc) => return Ok(doc),
      Err(StoreError::Conflict { collection, key }) if attempt < MAX_WRITE_ATTEMPTS => {
        debug!(collection, %key, attempt, "Write conflict, re-reading.");
        attempt += 1;
      }
      Err(e) => return Err(e.into()),
    }
  }
}
