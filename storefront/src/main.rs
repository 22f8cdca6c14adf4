// storefront/src/main.rs

use anyhow::Context;
use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use storefront::config::AppConfig;
use storefront::state::AppState;
use storefront::store::Stores;
use storefront::web::configure_app_routes;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

async fn open_stores(config: &AppConfig) -> anyhow::Result<Stores> {
  let Some(database_url) = config.database_url.as_deref() else {
    tracing::warn!("DATABASE_URL is not set; using the in-memory store. Data will not survive a restart.");
    return Ok(Stores::in_memory());
  };

  let pool = PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .acquire_timeout(config.store_timeout)
    .connect(database_url)
    .await
    .context("connecting to the database")?;
  tracing::info!("Successfully connected to the database.");

  if config.run_migrations {
    sqlx::migrate!("./migrations")
      .run(&pool)
      .await
      .context("running database migrations")?;
    tracing::info!("Database migrations applied.");
  }

  Ok(Stores::postgres(pool, config.store_timeout))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let config = AppConfig::from_env().context("loading configuration")?;
  let stores = open_stores(&config).await?;
  let app_state = AppState::build(config, stores).context("building application state")?;

  if let (Some(email), Some(password)) = (
    app_state.config.bootstrap_admin_email.as_deref(),
    app_state.config.bootstrap_admin_password.as_deref(),
  ) {
    app_state
      .accounts
      .ensure_bootstrap_admin(email, password)
      .await
      .context("creating bootstrap admin")?;
  }

  let server_address = format!("{}:{}", app_state.config.server_host, app_state.config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let data = actix_data::Data::new(app_state);
  HttpServer::new(move || {
    App::new()
      .app_data(data.clone())
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await
  .context("running HTTP server")
}
