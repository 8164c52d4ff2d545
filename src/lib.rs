//! # Player Stats
//!
//! Read-only statistics API over a collection of football player records.
//!
//! ## Architecture
//!
//! - **models**: Player documents and typed ranking views
//! - **store**: Document store access (MongoDB, in-memory/JSONL)
//! - **api**: REST API endpoints
//! - **calculate**: Derived metrics (tackle efficiency)
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod store;

pub use models::*;
