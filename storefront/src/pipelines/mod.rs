// storefront/src/pipelines/mod.rs

//! Defines and registers the stepflow pipelines used by the storefront.

use crate::errors::AppError;
use stepflow::Registry;

pub mod contexts;
pub mod order_pipeline;

/// Called once while building the application state.
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  tracing::info!("Registering stepflow pipelines...");

  registry.register_pipeline(order_pipeline::build_place_order_pipeline());

  tracing::info!("All application pipelines registered.");
}
