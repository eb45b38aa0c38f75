pub mod pricing;
pub mod product;
pub mod repository;

pub use pricing::{quote_line, LineQuote};
pub use product::{BulkTier, CatalogError, Product, ProductCategory, ProductDraft};
pub use repository::{CatalogRepository, CatalogStoreError, ProductFilter, ProductPage};
