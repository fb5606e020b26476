#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod history;
pub mod ledger;
pub mod reconcile;
pub mod telemetry;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;
