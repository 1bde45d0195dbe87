//! whizzy-core: household chore groups on top of a document store.
//!
//! # Conventions
//!
//! - **Errors**: operations return [`error::Result`]; failures carry an
//!   [`error::ErrorCode`] and a localized message for the person at the screen.
//! - **Logging**: use `tracing` macros (`info!` for writes, `debug!` for reads,
//!   `warn!` for discarded document fields).
//! - **Store access**: operations take the store as a generic `&S` argument.
//!   Nothing in this crate holds a global client.

pub mod catalog;
pub mod config;
pub mod error;
pub mod groups;
pub mod invite;
pub mod model;
pub mod points;
pub mod selection;
pub mod session;
pub mod store;
pub mod weekly;

pub use error::{ErrorCode, Result, WhizzyError};
