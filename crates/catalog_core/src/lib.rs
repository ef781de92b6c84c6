//! Catalog core: pure data model and record normalization.
mod collection;
mod normalize;
mod record;

pub use collection::{CatalogCollection, CategoryGroup, UNCATEGORIZED};
pub use normalize::{normalize, with_affiliate_param, AFFILIATE_PARAM, PLATFORM_BASE_URL};
pub use record::{NormalizedRecord, RawEntry};
