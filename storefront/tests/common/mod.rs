// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront::config::AppConfig;
use storefront::models::{Cart, CatalogItem, CatalogKind, Order, Role, SelectedItems};
use storefront::services::catalog::CatalogInput;
use storefront::services::token_service::{Claims, TokenKind};
use storefront::state::AppState;
use storefront::store::{
  Document, DocumentCollection, MemoryCollection, Precondition, StoreError, Stores, Versioned,
};
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// In-memory collection whose writes can be made to fail on demand, or
/// interleaved with another write right after a successful put.
pub struct FailingCollection<D> {
  inner: MemoryCollection<D>,
  pub fail_puts: AtomicBool,
  pub fail_deletes: AtomicBool,
  after_put: Mutex<Option<BoxFuture<'static, ()>>>,
}

impl<D: Document> FailingCollection<D> {
  pub fn new() -> Self {
    Self {
      inner: MemoryCollection::new(),
      fail_puts: AtomicBool::new(false),
      fail_deletes: AtomicBool::new(false),
      after_put: Mutex::new(None),
    }
  }

  /// Runs `interleave` once, after the next successful put.
  pub fn after_next_put(&self, interleave: BoxFuture<'static, ()>) {
    *self.after_put.lock() = Some(interleave);
  }

  pub fn fail_puts(&self, on: bool) {
    self.fail_puts.store(on, Ordering::SeqCst);
  }

  pub fn fail_deletes(&self, on: bool) {
    self.fail_deletes.store(on, Ordering::SeqCst);
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }
}

fn injected() -> StoreError {
  StoreError::Persist("injected failure".to_string())
}

#[async_trait]
impl<D: Document> DocumentCollection<D> for FailingCollection<D> {
  async fn find(&self, key: Uuid) -> Result<Option<Versioned<D>>, StoreError> {
    self.inner.find(key).await
  }

  async fn find_by_owner(&self, owner: Uuid) -> Result<Vec<D>, StoreError> {
    self.inner.find_by_owner(owner).await
  }

  async fn find_all(&self) -> Result<Vec<D>, StoreError> {
    self.inner.find_all().await
  }

  async fn put(&self, doc: &D, precondition: Precondition) -> Result<i64, StoreError> {
    if self.fail_puts.load(Ordering::SeqCst) {
      return Err(injected());
    }
    let version = self.inner.put(doc, precondition).await?;
    let interleave = self.after_put.lock().take();
    if let Some(interleave) = interleave {
      interleave.await;
    }
    Ok(version)
  }

  async fn delete(&self, key: Uuid, precondition: Precondition) -> Result<bool, StoreError> {
    if self.fail_deletes.load(Ordering::SeqCst) {
      return Err(injected());
    }
    self.inner.delete(key, precondition).await
  }
}

pub fn test_config() -> AppConfig {
  AppConfig::from_vars(|name| match name {
    "JWT_SECRET" => Some("test-access-secret".to_string()),
    "JWT_REFRESH_SECRET" => Some("test-refresh-secret".to_string()),
    _ => None,
  })
  .expect("test config")
}

/// Application state over in-memory stores, with handles on the
/// collections the saga writes to.
pub struct Harness {
  pub state: AppState,
  pub carts: Arc<FailingCollection<Cart>>,
  pub selections: Arc<FailingCollection<SelectedItems>>,
  pub orders: Arc<FailingCollection<Order>>,
}

pub fn harness() -> Harness {
  setup_tracing();
  let carts = Arc::new(FailingCollection::<Cart>::new());
  let selections = Arc::new(FailingCollection::<SelectedItems>::new());
  let orders = Arc::new(FailingCollection::<Order>::new());

  let mut stores = Stores::in_memory();
  stores.carts = carts.clone();
  stores.selections = selections.clone();
  stores.orders = orders.clone();

  let state = AppState::build(test_config(), stores).expect("state");
  Harness {
    state,
    carts,
    selections,
    orders,
  }
}

impl Harness {
  pub async fn product(&self, name: &str, price_cents: i64) -> CatalogItem {
    self
      .state
      .catalog
      .create(
        CatalogKind::Product,
        CatalogInput {
          name: name.to_string(),
          description: None,
          price_cents,
          stock: Some(100),
          image_url: Some(format!("/img/{}.png", name.to_lowercase())),
        },
      )
      .await
      .expect("seed product")
  }

  pub async fn service(&self, name: &str, price_cents: i64) -> CatalogItem {
    self
      .state
      .catalog
      .create(
        CatalogKind::Service,
        CatalogInput {
          name: name.to_string(),
          description: None,
          price_cents,
          stock: None,
          image_url: None,
        },
      )
      .await
      .expect("seed service")
  }

  pub async fn reprice(&self, item: &CatalogItem, price_cents: i64) {
    self
      .state
      .catalog
      .update(
        item.kind,
        item.id,
        CatalogInput {
          name: item.name.clone(),
          description: item.description.clone(),
          price_cents,
          stock: item.stock,
          image_url: item.image_url.clone(),
        },
      )
      .await
      .expect("reprice");
  }

  pub fn access_token(&self, user: Uuid, role: Role) -> String {
    self
      .state
      .tokens
      .issue(TokenKind::Access, user, role, Duration::from_secs(900))
      .expect("token")
  }
}

pub fn claims(sub: Uuid, role: Role) -> Claims {
  Claims {
    sub,
    role,
    iat: 0,
    exp: 0,
  }
}
