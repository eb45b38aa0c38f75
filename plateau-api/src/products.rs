use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use plateau_catalog::{BulkTier, Product, ProductCategory, ProductDraft, ProductFilter};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Unit price in kobo
    pub price: i64,
    pub category: ProductCategory,
    pub weight: String,
    pub stock: i64,
    pub images: Vec<String>,
    pub origin: String,
    pub is_active: bool,
    pub bulk_pricing: Vec<BulkTier>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price_kobo,
            category: product.category,
            weight: product.weight,
            stock: product.stock,
            images: product.images,
            origin: product.origin,
            is_active: product.is_active,
            bulk_pricing: product.bulk_pricing,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    /// Unit price in kobo
    pub price: i64,
    pub category: String,
    pub weight: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<String>,
    pub origin: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub bulk_pricing: Vec<BulkTier>,
}

impl ProductRequest {
    fn into_draft(self) -> Result<ProductDraft, AppError> {
        let category = ProductCategory::parse(&self.category).ok_or_else(|| {
            AppError::BadRequest(format!("unknown category: {}", self.category))
        })?;

        let draft = ProductDraft {
            name: self.name,
            description: self.description,
            price_kobo: self.price,
            category,
            weight: self.weight,
            stock: self.stock,
            images: self.images,
            origin: self.origin.unwrap_or_else(|| "Jos Plateau".to_string()),
            is_active: self.is_active.unwrap_or(true),
            bulk_pricing: self.bulk_pricing,
        };
        draft.validate()?;
        Ok(draft)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/products
/// Browse the active catalog, filtered and paginated
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductListResponse>, AppError> {
    let category = match &query.category {
        Some(raw) => Some(ProductCategory::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!("unknown category: {raw}"))
        })?),
        None => None,
    };
    let limit = query
        .limit
        .unwrap_or(state.paging.page_size)
        .clamp(1, state.paging.max_page_size);
    let page = query.page.unwrap_or(1).max(1);

    let listing = state
        .catalog
        .list_products(&ProductFilter {
            category,
            search: query.search.clone(),
            page,
            limit,
        })
        .await?;

    let total_pages = listing.total.div_ceil(u64::from(limit));

    Ok(Json(ProductListResponse {
        products: listing.products.into_iter().map(Into::into).collect(),
        total_pages,
        current_page: page,
        total: listing.total,
    }))
}

/// GET /api/products/:id
/// Fetch a single product, active or not
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product.into()))
}

/// POST /api/admin/products
/// Create a product (admin only)
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let draft = request.into_draft()?;

    let product = state.catalog.create_product(draft).await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /api/admin/products/:id
/// Replace a product's fields (admin only)
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<ProductResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let draft = request.into_draft()?;

    let product = state
        .catalog
        .update_product(product_id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product.into()))
}

/// DELETE /api/admin/products/:id
/// Remove a product from the catalog (admin only)
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = state.catalog.delete_product(product_id).await?;
    if !removed {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Product removed" })))
}
