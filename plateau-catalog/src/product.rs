use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product categories in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Fresh,
    Processed,
    Seeds,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Fresh => "fresh",
            ProductCategory::Processed => "processed",
            ProductCategory::Seeds => "seeds",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fresh" => Some(ProductCategory::Fresh),
            "processed" => Some(ProductCategory::Processed),
            "seeds" => Some(ProductCategory::Seeds),
            _ => None,
        }
    }
}

/// A quantity threshold with its percentage discount. The wire and storage
/// representation uses camelCase keys (`minQuantity`, `discount`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkTier {
    pub min_quantity: u32,
    /// Percentage in 0..=100
    pub discount: f64,
}

/// Core product structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Unit price in kobo (NGN minor units)
    pub price_kobo: i64,
    pub category: ProductCategory,
    pub weight: String,
    pub stock: i64,
    pub images: Vec<String>,
    pub origin: String,
    pub is_active: bool,
    pub bulk_pricing: Vec<BulkTier>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_draft(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            price_kobo: draft.price_kobo,
            category: draft.category,
            weight: draft.weight,
            stock: draft.stock,
            images: draft.images,
            origin: draft.origin,
            is_active: draft.is_active,
            bulk_pricing: draft.bulk_pricing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field from the draft, keeping identity and
    /// creation time.
    pub fn apply_draft(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price_kobo = draft.price_kobo;
        self.category = draft.category;
        self.weight = draft.weight;
        self.stock = draft.stock;
        self.images = draft.images;
        self.origin = draft.origin;
        self.is_active = draft.is_active;
        self.bulk_pricing = draft.bulk_pricing;
        self.updated_at = Utc::now();
    }

    /// Select the bulk tier that applies to `quantity`: the tier with the
    /// greatest `min_quantity` not exceeding it. Tiers are unordered in
    /// storage, so selection must not depend on their stored order.
    pub fn applicable_tier(&self, quantity: u32) -> Option<&BulkTier> {
        self.bulk_pricing
            .iter()
            .filter(|tier| tier.min_quantity <= quantity)
            .max_by_key(|tier| tier.min_quantity)
    }
}

/// Validated payload for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price_kobo: i64,
    pub category: ProductCategory,
    pub weight: String,
    pub stock: i64,
    pub images: Vec<String>,
    pub origin: String,
    pub is_active: bool,
    pub bulk_pricing: Vec<BulkTier>,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("name is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(CatalogError::Validation("description is required".into()));
        }
        if self.weight.trim().is_empty() {
            return Err(CatalogError::Validation("weight is required".into()));
        }
        if self.price_kobo < 0 {
            return Err(CatalogError::Validation("price must not be negative".into()));
        }
        if self.stock < 0 {
            return Err(CatalogError::Validation("stock must not be negative".into()));
        }
        for tier in &self.bulk_pricing {
            if tier.min_quantity < 1 {
                return Err(CatalogError::Validation(
                    "bulk tier minQuantity must be at least 1".into(),
                ));
            }
            if !(0.0..=100.0).contains(&tier.discount) {
                return Err(CatalogError::Validation(
                    "bulk tier discount must be between 0 and 100".into(),
                ));
            }
        }
        let mut thresholds: Vec<u32> = self.bulk_pricing.iter().map(|t| t.min_quantity).collect();
        thresholds.sort_unstable();
        thresholds.dedup();
        if thresholds.len() != self.bulk_pricing.len() {
            return Err(CatalogError::Validation(
                "bulk tiers must have distinct minQuantity thresholds".into(),
            ));
        }
        Ok(())
    }
}

/// Catalog-related errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
}
