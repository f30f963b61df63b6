pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod handler;
pub mod page;
pub mod render;
pub mod store;
pub mod telemetry;
