// storefront/src/state.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines::{self, contexts::SagaDeps};
use crate::services::auth_service::AccountService;
use crate::services::bookings::BookingService;
use crate::services::cart_store::CartStore;
use crate::services::catalog::{CatalogReader, CatalogService};
use crate::services::orders::OrderService;
use crate::services::selection_store::SelectionStore;
use crate::services::token_service::TokenService;
use crate::store::Stores;
use std::sync::Arc;
use stepflow::Registry;

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub tokens: Arc<TokenService>,
  pub accounts: AccountService,
  pub catalog: CatalogService,
  pub carts: CartStore,
  pub selections: SelectionStore,
  pub orders: OrderService,
  pub bookings: BookingService,
  pub flows: Arc<Registry<AppError>>,
}

impl AppState {
  /// Wires services over `stores` and registers the pipelines.
  pub fn build(config: AppConfig, stores: Stores) -> Result<Self> {
    let tokens = Arc::new(TokenService::from_config(&config)?);
    let catalog = CatalogService::new(stores.catalog.clone());
    let reader: Arc<dyn CatalogReader> = Arc::new(catalog.clone());

    let carts = CartStore::new(stores.carts.clone(), reader.clone());
    let selections = SelectionStore::new(stores.selections.clone(), reader.clone());

    let flows = Arc::new(Registry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);

    let saga = SagaDeps {
      catalog: reader.clone(),
      carts: carts.clone(),
      selections: stores.selections.clone(),
      orders: stores.orders.clone(),
    };

    Ok(Self {
      config: Arc::new(config),
      accounts: AccountService::new(stores.users.clone(), tokens.clone()),
      tokens,
      catalog,
      carts,
      selections,
      orders: OrderService::new(saga, flows.clone()),
      bookings: BookingService::new(stores.bookings.clone(), reader),
      flows,
    })
  }
}
