pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod storage;
pub mod types;

// Domain data shapes shared across layers
pub mod domain;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

pub mod observability;
pub mod server;
