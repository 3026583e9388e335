//! trellis-core library.
//!
//! Task store, parent/child hierarchy graph, cycle validation, and cascading
//! completion for the trellis task tracker.
//!
//! # Conventions
//!
//! - **Errors**: store and config helpers return `anyhow::Result`; the
//!   service surface returns [`HierarchyError`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod model;
pub mod service;

pub use error::{ErrorCode, HierarchyError};
pub use service::HierarchyService;
