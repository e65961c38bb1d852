//! Ingestion, normalization and aggregation for the flood SOS case feed.
//!
//! The feed is fetched in one bulk request, each record's nested `location`
//! is flattened into a [`Case`](models::Case), and the resulting
//! [`CaseTable`](models::CaseTable) is cached and summarized for display.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod models;
pub mod report;
