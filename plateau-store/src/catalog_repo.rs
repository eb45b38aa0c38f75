use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use plateau_catalog::{
    CatalogRepository, CatalogStoreError, Product, ProductCategory, ProductDraft, ProductFilter,
    ProductPage,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price_kobo, category, weight, stock, \
     images, origin, is_active, bulk_pricing, created_at, updated_at";

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price_kobo: i64,
    category: String,
    weight: String,
    stock: i64,
    images: Vec<String>,
    origin: String,
    is_active: bool,
    bulk_pricing: Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn backend(err: sqlx::Error) -> CatalogStoreError {
    CatalogStoreError::Backend(Box::new(err))
}

impl TryFrom<ProductRow> for Product {
    type Error = CatalogStoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = ProductCategory::parse(&row.category).ok_or_else(|| {
            CatalogStoreError::Backend(
                format!("unknown product category in storage: {}", row.category).into(),
            )
        })?;
        let bulk_pricing = serde_json::from_value(row.bulk_pricing)
            .map_err(|e| CatalogStoreError::Backend(Box::new(e)))?;

        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price_kobo: row.price_kobo,
            category,
            weight: row.weight,
            stock: row.stock,
            images: row.images,
            origin: row.origin,
            is_active: row.is_active,
            bulk_pricing,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, CatalogStoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Product::try_from).transpose()
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, CatalogStoreError> {
        let category = filter.category.map(|c| c.as_str());
        let pattern = filter.search.as_ref().map(|s| format!("%{s}%"));
        let page = filter.page.max(1);
        let offset = i64::from(page - 1) * i64::from(filter.limit);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products \
             WHERE is_active = TRUE \
               AND ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)",
        )
        .bind(category)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = TRUE \
               AND ($1::text IS NULL OR category = $1) \
               AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(category)
        .bind(pattern.as_deref())
        .bind(i64::from(filter.limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let products = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductPage {
            products,
            total: total as u64,
        })
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, CatalogStoreError> {
        let product = Product::from_draft(draft);
        let bulk_pricing = serde_json::to_value(&product.bulk_pricing)
            .map_err(|e| CatalogStoreError::Backend(Box::new(e)))?;

        sqlx::query(
            "INSERT INTO products \
             (id, name, description, price_kobo, category, weight, stock, images, origin, is_active, bulk_pricing, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_kobo)
        .bind(product.category.as_str())
        .bind(&product.weight)
        .bind(product.stock)
        .bind(&product.images)
        .bind(&product.origin)
        .bind(product.is_active)
        .bind(&bulk_pricing)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(product)
    }

    async fn update_product(
        &self,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Option<Product>, CatalogStoreError> {
        let bulk_pricing = serde_json::to_value(&draft.bulk_pricing)
            .map_err(|e| CatalogStoreError::Backend(Box::new(e)))?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET \
               name = $1, description = $2, price_kobo = $3, category = $4, weight = $5, \
               stock = $6, images = $7, origin = $8, is_active = $9, bulk_pricing = $10, \
               updated_at = NOW() \
             WHERE id = $11 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price_kobo)
        .bind(draft.category.as_str())
        .bind(&draft.weight)
        .bind(draft.stock)
        .bind(&draft.images)
        .bind(&draft.origin)
        .bind(draft.is_active)
        .bind(&bulk_pricing)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, CatalogStoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }
}
