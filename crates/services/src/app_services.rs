use std::sync::Arc;

use chess_edu_core::Catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::progress_service::ProgressService;

/// Assembles the services behind the HTTP surface.
#[derive(Clone)]
pub struct AppServices {
    catalog_service: Arc<CatalogService>,
    progress_service: Arc<ProgressService>,
}

impl AppServices {
    /// Build services over an existing storage aggregate.
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, storage: &Storage) -> Self {
        let catalog_service = Arc::new(CatalogService::new(Arc::clone(&catalog)));
        let progress_service = Arc::new(ProgressService::new(
            clock,
            catalog,
            Arc::clone(&storage.progress),
        ));

        Self {
            catalog_service,
            progress_service,
        }
    }

    /// Build services backed by process-local storage.
    #[must_use]
    pub fn in_memory(clock: Clock, catalog: Arc<Catalog>) -> Self {
        Self::new(clock, catalog, &Storage::in_memory())
    }

    #[must_use]
    pub fn catalog_service(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog_service)
    }

    #[must_use]
    pub fn progress_service(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress_service)
    }
}
