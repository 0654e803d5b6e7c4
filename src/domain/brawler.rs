//! Brawler reference catalog.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog entry. Seeded once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Brawler {
    /// External brawler id (unique).
    pub brawler_id: i32,
    /// Brawler name.
    pub name: String,
}

impl Brawler {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(brawler_id: i32, name: impl Into<String>) -> Self {
        Self {
            brawler_id,
            name: name.into(),
        }
    }
}

/// Catalog used when the external API returns nothing at seeding time.
#[must_use]
pub fn fallback_catalog() -> Vec<Brawler> {
    [
        (16_000_000, "Shelly"),
        (16_000_001, "Colt"),
        (16_000_002, "Bull"),
        (16_000_003, "Brock"),
        (16_000_004, "Rico"),
        (16_000_005, "Spike"),
        (16_000_006, "Barley"),
        (16_000_007, "Jessie"),
        (16_000_008, "Nita"),
        (16_000_009, "Dynamike"),
        (16_000_010, "El Primo"),
    ]
    .into_iter()
    .map(|(id, name)| Brawler::new(id, name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_catalog_has_unique_ids() {
        let catalog = fallback_catalog();
        assert_eq!(catalog.len(), 11);
        let ids: std::collections::HashSet<i32> = catalog.iter().map(|b| b.brawler_id).collect();
        assert_eq!(ids.len(), catalog.len());
    }
}
