// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs against the in-memory store.
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub run_migrations: bool,

  pub jwt_secret: String,
  pub jwt_refresh_secret: String,
  pub access_token_ttl: Duration,
  pub refresh_token_ttl: Duration,

  pub store_timeout: Duration,

  pub bootstrap_admin_email: Option<String>,
  pub bootstrap_admin_password: Option<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_vars(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let non_empty = |name: &str| get(name).filter(|value| !value.trim().is_empty());

    let server_host = non_empty("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&non_empty, "SERVER_PORT", 8080u16)?;
    let database_url = non_empty("DATABASE_URL");
    let db_max_connections = parse_or(&non_empty, "DB_MAX_CONNECTIONS", 10u32)?;
    let run_migrations = parse_or(&non_empty, "RUN_MIGRATIONS", true)?;

    let jwt_secret = non_empty("JWT_SECRET")
      .ok_or_else(|| AppError::Config("Missing environment variable 'JWT_SECRET'".to_string()))?;
    let jwt_refresh_secret = non_empty("JWT_REFRESH_SECRET")
      .ok_or_else(|| AppError::Config("Missing environment variable 'JWT_REFRESH_SECRET'".to_string()))?;
    if jwt_secret == jwt_refresh_secret {
      return Err(AppError::Config(
        "JWT_SECRET and JWT_REFRESH_SECRET must differ".to_string(),
      ));
    }

    let access_token_ttl = Duration::from_secs(parse_or(&non_empty, "ACCESS_TOKEN_TTL_SECS", 900u64)?);
    let refresh_token_ttl = Duration::from_secs(parse_or(&non_empty, "REFRESH_TOKEN_TTL_SECS", 604_800u64)?);
    if access_token_ttl.is_zero() || refresh_token_ttl.is_zero() {
      return Err(AppError::Config("Token lifetimes must be positive".to_string()));
    }

    let store_timeout = Duration::from_millis(parse_or(&non_empty, "STORE_TIMEOUT_MS", 5_000u64)?);

    let bootstrap_admin_email = non_empty("BOOTSTRAP_ADMIN_EMAIL");
    let bootstrap_admin_password = non_empty("BOOTSTRAP_ADMIN_PASSWORD");
    if bootstrap_admin_email.is_some() != bootstrap_admin_password.is_some() {
      return Err(AppError::Config(
        "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together".to_string(),
      ));
    }

    tracing::info!(
      persistent = database_url.is_some(),
      access_ttl_secs = access_token_ttl.as_secs(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      run_migrations,
      jwt_secret,
      jwt_refresh_secret,
      access_token_ttl,
      refresh_token_ttl,
      store_timeout,
      bootstrap_admin_email,
      bootstrap_admin_password,
    })
  }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match get(name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_vars(|name| vars.get(name).cloned())
  }

  #[test]
  fn defaults_apply_when_only_secrets_are_set() {
    let config = config_from(&[("JWT_SECRET", "access-key"), ("JWT_REFRESH_SECRET", "refresh-key")]).unwrap();
    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 8080);
    assert!(config.database_url.is_none());
    assert_eq!(config.access_token_ttl, Duration::from_secs(900));
    assert_eq!(config.refresh_token_ttl, Duration::from_secs(7 * 24 * 3600));
    assert_eq!(config.store_timeout, Duration::from_millis(5_000));
    assert!(config.run_migrations);
  }

  #[test]
  fn missing_or_shared_secrets_are_fatal() {
    assert!(matches!(config_from(&[("JWT_SECRET", "x")]), Err(AppError::Config(_))));
    assert!(matches!(
      config_from(&[("JWT_SECRET", "same"), ("JWT_REFRESH_SECRET", "same")]),
      Err(AppError::Config(_))
    ));
    assert!(matches!(
      config_from(&[("JWT_SECRET", " "), ("JWT_REFRESH_SECRET", "refresh")]),
      Err(AppError::Config(_))
    ));
  }

  #[test]
  fn legacy_single_day_access_tokens_are_a_ttl_setting() {
    let config = config_from(&[
      ("JWT_SECRET", "a"),
      ("JWT_REFRESH_SECRET", "b"),
      ("ACCESS_TOKEN_TTL_SECS", "86400"),
    ])
    .unwrap();
    assert_eq!(config.access_token_ttl, Duration::from_secs(86_400));
  }

  #[test]
  fn unparsable_numbers_are_reported() {
    let err = config_from(&[("JWT_SECRET", "a"), ("JWT_REFRESH_SECRET", "b"), ("SERVER_PORT", "eighty")]).unwrap_err();
    assert!(err.to_string().contains("SERVER_PORT"));
  }
}
