//! Extract-transform-load for the Sparkify warehouse.
//!
//! Catalog files become `songs` and `artists` rows; activity logs become
//! `time`, `users` and `songplays` rows. [`runner::run_batch`] walks an input
//! tree and hands each file to a [`runner::FileProcessor`], which writes the
//! file's rows through any [`sparkify_core::store::Warehouse`] as one
//! transaction.

// Native `async fn` in traits; processors are only driven on the current task.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod report;
pub mod runner;

pub use activity::LogFileProcessor;
pub use catalog::SongFileProcessor;
pub use config::EtlConfig;
pub use error::BatchError;
pub use runner::{run_batch, run_batch_with_progress, BatchReport, FailurePolicy, FileProcessor, LoadSummary};
