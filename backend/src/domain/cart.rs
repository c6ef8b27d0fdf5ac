//! Shopping cart lines.

use super::catalog::{Product, ProductId};
use super::user::UserId;

/// Stored cart row. At most one exists per (user, product) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub id: i64,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Cart line joined with the current product snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub line_id: i64,
    pub quantity: i32,
    pub product: Product,
}

/// Outcome of a quantity update; non-positive quantities remove the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdate {
    Updated(CartItem),
    Removed,
}
