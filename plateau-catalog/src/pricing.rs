use crate::product::{BulkTier, Product};

/// Priced view of one cart line. All amounts are in kobo; the discount is
/// already netted out of `line_total_kobo`, so
/// `raw_subtotal_kobo - discount_kobo == line_total_kobo` always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct LineQuote {
    pub unit_price_kobo: i64,
    pub quantity: u32,
    pub raw_subtotal_kobo: i64,
    pub discount_kobo: i64,
    pub line_total_kobo: i64,
    pub applied_tier: Option<BulkTier>,
}

/// Price one cart line against the current catalog entry.
///
/// The unit price is captured undiscounted; the bulk discount is computed
/// from the single applicable tier (greatest qualifying threshold, never
/// stacked) and rounded to the nearest kobo.
pub fn quote_line(product: &Product, quantity: u32) -> LineQuote {
    let raw_subtotal = product.price_kobo * quantity as i64;

    let applied_tier = product.applicable_tier(quantity).cloned();
    let discount = match &applied_tier {
        Some(tier) => (raw_subtotal as f64 * tier.discount / 100.0).round() as i64,
        None => 0,
    };

    LineQuote {
        unit_price_kobo: product.price_kobo,
        quantity,
        raw_subtotal_kobo: raw_subtotal,
        discount_kobo: discount,
        line_total_kobo: raw_subtotal - discount,
        applied_tier,
    }
}
