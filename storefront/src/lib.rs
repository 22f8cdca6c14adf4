// storefront/src/lib.rs

//! Storefront backend: carts, selections and orders behind a role-ordered
//! bearer-token gate. Order placement runs as a `stepflow` pipeline.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
