//! Brawler catalog seeding.

use crate::domain::brawler::fallback_catalog;
use crate::domain::Brawler;
use crate::error::AnalyticsError;
use crate::fetch::Fetcher;
use crate::persistence::Storage;

/// Where a seeded catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// The catalog was already populated; nothing was written.
    Existing,
    /// Fetched from the external API.
    External,
    /// The built-in fallback list.
    Fallback,
}

/// Populates an empty catalog, preferring the external API and falling
/// back to the built-in list. Returns the source and the number of entries
/// written.
///
/// # Errors
///
/// Returns [`AnalyticsError::PersistenceError`] on storage failure.
pub async fn seed_brawler_catalog(
    fetcher: &dyn Fetcher,
    storage: &dyn Storage,
) -> Result<(CatalogSource, u64), AnalyticsError> {
    let current = storage.get_brawler_catalog().await?;
    if !current.is_empty() {
        tracing::debug!(entries = current.len(), "brawler catalog already seeded");
        return Ok((CatalogSource::Existing, 0));
    }

    let external: Vec<Brawler> = fetcher
        .fetch_brawler_catalog()
        .await
        .into_iter()
        .filter(|b| b.id > 0 && !b.name.trim().is_empty())
        .map(|b| Brawler::new(b.id, b.name))
        .collect();

    let (source, entries) = if external.is_empty() {
        tracing::warn!("external brawler catalog unavailable, seeding fallback list");
        (CatalogSource::Fallback, fallback_catalog())
    } else {
        (CatalogSource::External, external)
    };

    let inserted = storage.insert_brawlers(&entries).await?;
    tracing::info!(?source, inserted, "brawler catalog seeded");
    Ok((source, inserted))
}
