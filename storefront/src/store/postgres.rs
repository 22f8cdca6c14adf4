// storefront/src/store/postgres.rs

use super::{Document, DocumentCollection, Precondition, StoreError, Versioned};
use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

/// JSONB-backed collection. The table name is the document's collection name.
pub struct PgCollection<D> {
  pool: PgPool,
  timeout: Duration,
  _doc: PhantomData<fn() -> D>,
}

impl<D: Document> PgCollection<D> {
  pub fn new(pool: PgPool, timeout: Duration) -> Self {
    Self {
      pool,
      timeout,
      _doc: PhantomData,
    }
  }

  async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
  where
    F: Future<Output = Result<T, sqlx::Error>>,
  {
    match tokio::time::timeout(self.timeout, fut).await {
      Ok(result) => result.map_err(StoreError::from),
      Err(_) => Err(StoreError::Timeout {
        op,
        collection: D::COLLECTION,
        after: self.timeout,
      }),
    }
  }

  fn conflict(key: Uuid) -> StoreError {
    StoreError::Conflict {
      collection: D::COLLECTION,
      key,
    }
  }
}

fn decode<D: Document>(raw: serde_json::Value) -> Result<D, StoreError> {
  serde_json::from_value(raw).map_err(StoreError::from)
}

#[async_trait]
impl<D: Document> DocumentCollection<D> for PgCollection<D> {
  #[instrument(name = "PgCollection::find", skip(self), fields(collection = D::COLLECTION), err(Display))]
  async fn find(&self, key: Uuid) -> Result<Option<Versioned<D>>, StoreError> {
    let sql = format!("SELECT version, doc FROM {} WHERE key = $1", D::COLLECTION);
    let row = self
      .bounded(
        "find",
        sqlx::query_as::<_, (i64, serde_json::Value)>(&sql)
          .bind(key)
          .fetch_optional(&self.pool),
      )
      .await?;

    match row {
      Some((version, raw)) => Ok(Some(Versioned {
        version,
        doc: decode(raw)?,
      })),
      None => Ok(None),
    }
  }

  #[instrument(name = "PgCollection::find_by_owner", skip(self), fields(collection = D::COLLECTION), err(Display))]
  async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<D>, StoreError> {
    let sql = format!("SELECT doc FROM {} WHERE owner = $1", D::COLLECTION);
    let rows = self
      .bounded(
        "find_by_owner",
        sqlx::query_scalar::<_, serde_json::Value>(&sql)
          .bind(owner)
          .fetch_all(&self.pool),
      )
      .await?;
    rows.into_iter().map(decode::<D>).collect()
  }

  #[instrument(name = "PgCollection::find_all", skip(self), fields(collection = D::COLLECTION), err(Display))]
  async fn find_all(&self) -> Result<Vec<D>, StoreError> {
    let sql = format!("SELECT doc FROM {}", D::COLLECTION);
    let rows = self
      .bounded(
        "find_all",
        sqlx::query_scalar::<_, serde_json::Value>(&sql).fetch_all(&self.pool),
      )
      .await?;
    rows.into_iter().map(decode::<D>).collect()
  }

  #[instrument(
    name = "PgCollection::put",
    skip(self, doc),
    fields(collection = D::COLLECTION, key = %doc.key()),
    err(Display)
  )]
  async fn put(&self, doc: &D, precondition: Precondition) -> Result<i64, StoreError> {
    let key = doc.key();
    let raw = serde_json::to_value(doc)?;
    let table = D::COLLECTION;

    let written = match precondition {
      Precondition::Any => {
        let sql = format!(
          "INSERT INTO {table} (key, owner, version, doc, updated_at) VALUES ($1, $2, 1, $3, NOW()) \
           ON CONFLICT (key) DO UPDATE SET owner = EXCLUDED.owner, version = {table}.version + 1, \
           doc = EXCLUDED.doc, updated_at = NOW() RETURNING version"
        );
        let version = self
          .bounded(
            "put",
            sqlx::query_scalar::<_, i64>(&sql)
              .bind(key)
              .bind(doc.owner())
              .bind(&raw)
              .fetch_one(&self.pool),
          )
          .await?;
        Some(version)
      }
      Precondition::Absent => {
        let sql = format!(
          "INSERT INTO {table} (key, owner, version, doc, updated_at) VALUES ($1, $2, 1, $3, NOW()) \
           ON CONFLICT (key) DO NOTHING RETURNING version"
        );
        self
          .bounded(
            "put",
            sqlx::query_scalar::<_, i64>(&sql)
              .bind(key)
              .bind(doc.owner())
              .bind(&raw)
              .fetch_optional(&self.pool),
          )
          .await?
      }
      Precondition::Version(expected) => {
        let sql = format!(
          "UPDATE {table} SET owner = $2, version = version + 1, doc = $3, updated_at = NOW() \
           WHERE key = $1 AND version = $4 RETURNING version"
        );
        self
          .bounded(
            "put",
            sqlx::query_scalar::<_, i64>(&sql)
              .bind(key)
              .bind(doc.owner())
              .bind(&raw)
              .bind(expected)
              .fetch_optional(&self.pool),
          )
          .await?
      }
    };

    match written {
      Some(version) => {
        debug!(version, "Document stored.");
        Ok(version)
      }
      None => Err(Self::conflict(key)),
    }
  }

  #[instrument(name = "PgCollection::delete", skip(self), fields(collection = D::COLLECTION), err(Display))]
  async fn delete(&self, key: Uuid, precondition: Precondition) -> Result<bool, StoreError> {
    let table = D::COLLECTION;
    match precondition {
      Precondition::Any => {
        let sql = format!("DELETE FROM {table} WHERE key = $1");
        let done = self
          .bounded("delete", sqlx::query(&sql).bind(key).execute(&self.pool))
          .await?;
        Ok(done.rows_affected() > 0)
      }
      Precondition::Absent => match self.find(key).await? {
        Some(_) => Err(Self::conflict(key)),
        None => Ok(false),
      },
      Precondition::Version(expected) => {
        let sql = format!("DELETE FROM {table} WHERE key = $1 AND version = $2");
        let done = self
          .bounded(
            "delete",
            sqlx::query(&sql).bind(key).bind(expected).execute(&self.pool),
          )
          .await?;
        if done.rows_affected() == 0 {
          return Err(Self::conflict(key));
        }
        Ok(true)
      }
    }
  }
}
