use std::sync::Arc;

use plateau_catalog::CatalogRepository;
use plateau_order::OrderService;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Listing page sizes, from the `[catalog]` config section.
#[derive(Clone, Copy)]
pub struct CatalogPaging {
    pub page_size: u32,
    pub max_page_size: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub orders: Arc<OrderService>,
    pub auth: AuthConfig,
    pub paging: CatalogPaging,
}
