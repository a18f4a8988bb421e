#![forbid(unsafe_code)]

pub mod catalog;
pub mod model;
pub mod reconciler;
pub mod time;

pub use catalog::{Catalog, CatalogDocument, CatalogError};
pub use reconciler::{ImportError, ProgressEvent, ReconcileError, ReconcileOutcome, Reconciler};
pub use time::Clock;
