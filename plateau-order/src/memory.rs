use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use plateau_catalog::{
    CatalogRepository, CatalogStoreError, Product, ProductDraft, ProductFilter, ProductPage,
};

use crate::models::{FulfillmentStatus, Order};
use crate::repository::{OrderRepository, OrderStoreError};

struct Inner {
    products: HashMap<Uuid, Product>,
    orders: Vec<Order>,
}

/// In-memory catalog and order store. Backs tests and local development;
/// the order insert mirrors the database's transactional semantics, so a
/// rejected order leaves stock levels untouched.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                products: HashMap::new(),
                orders: Vec::new(),
            }),
        }
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                products: products.into_iter().map(|p| (p.id, p)).collect(),
                orders: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, CatalogStoreError> {
        let inner = self.inner.read().await;
        Ok(inner.products.get(&id).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, CatalogStoreError> {
        let inner = self.inner.read().await;
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut matching: Vec<Product> = inner
            .products
            .values()
            .filter(|p| p.is_active)
            .filter(|p| filter.category.map_or(true, |c| p.category == c))
            .filter(|p| {
                needle.as_ref().map_or(true, |n| {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                })
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let page = filter.page.max(1);
        let skip = ((page - 1) * filter.limit) as usize;
        let products = matching
            .into_iter()
            .skip(skip)
            .take(filter.limit as usize)
            .collect();

        Ok(ProductPage { products, total })
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, CatalogStoreError> {
        let product = Product::from_draft(draft);
        let mut inner = self.inner.write().await;
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Option<Product>, CatalogStoreError> {
        let mut inner = self.inner.write().await;
        match inner.products.get_mut(&id) {
            Some(product) => {
                product.apply_draft(draft);
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, CatalogStoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.products.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<(), OrderStoreError> {
        let mut inner = self.inner.write().await;

        // Walk the lines against working stock levels and only commit once
        // every line clears, the same all-or-nothing outcome the database
        // transaction gives. Repeated product lines draw down the same
        // working balance.
        let mut working_stock: HashMap<Uuid, i64> = HashMap::new();
        for item in &order.items {
            let product = inner
                .products
                .get(&item.product_id)
                .ok_or(OrderStoreError::ProductNotFound(item.product_id))?;
            let available = *working_stock
                .entry(item.product_id)
                .or_insert(product.stock);
            let requested = i64::from(item.quantity);
            if available < requested {
                return Err(OrderStoreError::InsufficientStock {
                    product_id: item.product_id,
                    requested,
                    available,
                });
            }
            working_stock.insert(item.product_id, available - requested);
        }

        for (product_id, stock) in working_stock {
            if let Some(product) = inner.products.get_mut(&product_id) {
                product.stock = stock;
                product.updated_at = Utc::now();
            }
        }
        inner.orders.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderStoreError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Order>, OrderStoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .rev()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Order>, OrderStoreError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().rev().cloned().collect())
    }

    async fn update_fulfillment_status(
        &self,
        order_id: Uuid,
        new_status: FulfillmentStatus,
    ) -> Result<Option<Order>, OrderStoreError> {
        let mut inner = self.inner.write().await;
        match inner.orders.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.update_fulfillment_status(new_status);
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }
}
