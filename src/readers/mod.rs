pub mod region_catalog;
pub mod series_reader;

pub use region_catalog::{CatalogEntity, ParentRegion, RegionCatalog};
pub use series_reader::SeriesReader;
