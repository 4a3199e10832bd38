//! Core types and trait definitions for the Sparkify warehouse loader.
//!
//! This crate is deliberately free of database and CLI dependencies. It holds
//! the relational row types, the typed views over raw JSON records, the
//! calendar derivation for time buckets, and the [`store::Warehouse`] seam
//! that storage backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod model;
pub mod record;
pub mod store;
pub mod time;

pub use error::{Error, Result};
