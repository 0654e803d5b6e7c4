//! Service layer: business logic orchestration.
//!
//! [`PlayerService`] drives tracking, synchronization and analytics over the
//! fetch and storage seams. [`catalog`] seeds the brawler catalog at
//! startup.

pub mod catalog;
pub mod player_service;

pub use catalog::{CatalogSource, seed_brawler_catalog};
pub use player_service::{PlayerService, SyncReport, SyncSettings};
