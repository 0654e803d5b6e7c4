//! # brawl-analytics
//!
//! Ingests Brawl Stars match history from the official stats API, stores it
//! in PostgreSQL and derives player analytics on demand: win rate, a custom
//! skill rating, consistency, clutch rating, brawler mastery and recent form.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── PlayerService (service/)
//!     │     ├── TagLocks (domain/)          per-tag serialization
//!     │     ├── Reconciler, Aggregator (sync/)
//!     │     └── Metric calculators (metrics/)
//!     │
//!     ├── Fetcher ── BrawlApiClient (fetch/) ── Brawl Stars API
//!     │
//!     └── Storage ── PostgresStorage | MemoryStorage (persistence/)
//! ```
//!
//! `sync` and `metrics` are pure: they never touch the network, the
//! database or the clock, so every analytics view can be reproduced from the
//! stored rows alone.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod persistence;
pub mod service;
pub mod sync;
