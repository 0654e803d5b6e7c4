//! Pure halves of the synchronization workflow.
//!
//! [`reconciler`] turns fetched battle records into new battles, skipping
//! those already stored. [`aggregator`] recomputes per-brawler counters from
//! stored battles. Neither touches I/O; the orchestrator in
//! [`crate::service`] feeds them and persists their output.

pub mod aggregator;
pub mod reconciler;

pub use aggregator::recompute_brawler_stats;
pub use reconciler::{ReconcileOutcome, reconcile};
