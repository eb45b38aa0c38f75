use crate::product::{Product, ProductCategory, ProductDraft};
use async_trait::async_trait;
use uuid::Uuid;

/// Listing filter. `page` is 1-based; callers clamp `limit` to their
/// configured maximum before building the filter.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

/// One page of active products plus the total matching count.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogStoreError {
    #[error("catalog storage failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Read and administer the product catalog. Stock decrements are not part
/// of this interface: they happen inside the order store's transactional
/// insert so that check-and-decrement stays atomic.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, CatalogStoreError>;

    /// Active products only, newest first.
    async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, CatalogStoreError>;

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, CatalogStoreError>;

    /// Full replacement of the product's fields. Returns `None` if the
    /// product does not exist.
    async fn update_product(
        &self,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Option<Product>, CatalogStoreError>;

    /// Returns `false` if the product does not exist.
    async fn delete_product(&self, id: Uuid) -> Result<bool, CatalogStoreError>;
}
