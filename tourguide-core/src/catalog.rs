//! Load-once attraction catalog.
//!
//! The provider's catalog is static for the process lifetime, so it is
//! fetched on first use and then shared as an immutable snapshot. A failed
//! load is not remembered; the next caller tries again.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{Attraction, LocationProvider, ProviderError};

/// Shared, immutable view of the attraction catalog.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use uuid::Uuid;
/// use tourguide_core::{Attraction, AttractionCatalog};
///
/// let catalog = AttractionCatalog::from_attractions(vec![Attraction::new(
///     Uuid::nil(),
///     "Origin",
///     Coord { x: 0.0, y: 0.0 },
/// )]);
/// assert_eq!(catalog.attractions()?.len(), 1);
/// # Ok::<(), tourguide_core::ProviderError>(())
/// ```
pub struct AttractionCatalog {
    source: Option<Arc<dyn LocationProvider>>,
    attractions: OnceCell<Arc<[Attraction]>>,
}

impl std::fmt::Debug for AttractionCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttractionCatalog")
            .field("loaded", &self.attractions.get().map(|a| a.len()))
            .finish_non_exhaustive()
    }
}

impl AttractionCatalog {
    /// Catalog backed by `provider`, fetched lazily on first access.
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            source: Some(provider),
            attractions: OnceCell::new(),
        }
    }

    /// Catalog preloaded with a fixed set of attractions.
    pub fn from_attractions(attractions: Vec<Attraction>) -> Self {
        Self {
            source: None,
            attractions: OnceCell::with_value(attractions.into()),
        }
    }

    /// The catalog snapshot, loading it from the provider if needed.
    pub fn attractions(&self) -> Result<Arc<[Attraction]>, ProviderError> {
        self.attractions
            .get_or_try_init(|| -> Result<Arc<[Attraction]>, ProviderError> {
                let Some(provider) = self.source.as_ref() else {
                    return Ok(Arc::from(Vec::new()));
                };
                let attractions = provider.attractions()?;
                log::info!("loaded {} attractions from location provider", attractions.len());
                Ok(Arc::from(attractions))
            })
            .map(Arc::clone)
    }

    /// Whether the catalog has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.attractions.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::rstest;
    use uuid::Uuid;

    use crate::test_support::StaticLocationProvider;

    #[rstest]
    fn loads_once_and_shares_snapshot() {
        let attraction = Attraction::new(Uuid::new_v4(), "Union Station", Coord { x: 0.0, y: 0.0 });
        let provider = Arc::new(StaticLocationProvider::new(vec![attraction]));
        let catalog = AttractionCatalog::new(Arc::clone(&provider) as Arc<dyn LocationProvider>);

        assert!(!catalog.is_loaded());
        let first = catalog.attractions().expect("catalog loads");
        let second = catalog.attractions().expect("catalog loads");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.catalog_calls(), 1);
    }

    #[rstest]
    fn failed_load_is_retried() {
        let provider = Arc::new(StaticLocationProvider::new(Vec::new()).with_failing_catalog(1));
        let catalog = AttractionCatalog::new(Arc::clone(&provider) as Arc<dyn LocationProvider>);

        assert!(catalog.attractions().is_err());
        assert!(!catalog.is_loaded());
        assert!(catalog.attractions().is_ok());
        assert_eq!(provider.catalog_calls(), 2);
    }
}
