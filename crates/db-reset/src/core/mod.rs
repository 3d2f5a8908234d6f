//! Core abstractions shared by the drivers and the reset scripts.
//!
//! - [`traits`]: the [`Connection`] trait every driver implements
//! - [`identifier`]: validation and per-dialect quoting of catalog names

pub mod identifier;
pub mod traits;

pub use traits::Connection;
