//! Fixed price table: board size to unit price per play-week.
use crate::errors::{DomainError, DomainResult};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

static PRICE_TABLE: Lazy<BTreeMap<i64, f64>> = Lazy::new(|| {
    BTreeMap::from([(5, 20.0), (6, 40.0), (7, 80.0), (8, 160.0)])
});

/// The deepest a single purchase may go into a user's funds.
pub const MAX_PURCHASE_DEBIT: f64 = 1000.0;

/// Unit price for one play-week of a board of the given size.
pub fn unit_price(size: i64) -> DomainResult<f64> {
    PRICE_TABLE
        .get(&size)
        .copied()
        .ok_or_else(|| DomainError::RangeValidation(format!("no price for board size {}", size)))
}

/// Signed charge for buying `weeks_purchased` weeks of a board of `size`.
/// Always negative for a valid size.
pub fn purchase_amount(size: i64, weeks_purchased: i64) -> DomainResult<f64> {
    let price = unit_price(size)?;
    Ok(-(price * weeks_purchased as f64))
}
