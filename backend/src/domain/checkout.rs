//! Checkout planning.
//!
//! [`CheckoutPlan::build`] validates a whole set of line items against locked
//! stock levels before anything is written. Persistence adapters call it
//! inside their transaction and apply the plan only when it succeeds, which
//! keeps stock non-negative and makes a failed checkout leave no trace.

use std::collections::HashMap;
use std::fmt;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

use super::catalog::ProductId;
use super::order::OrderStatus;
use super::user::UserId;

/// Requested (product, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl LineItem {
    pub const fn new(product_id: ProductId, quantity: i32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Merge repeated products into one line, keeping first-seen order.
///
/// # Examples
/// ```
/// use storefront::domain::{merge_line_items, LineItem, ProductId};
///
/// let merged = merge_line_items(vec![
///     LineItem::new(ProductId::new(2), 1),
///     LineItem::new(ProductId::new(1), 2),
///     LineItem::new(ProductId::new(2), 3),
/// ]);
/// assert_eq!(merged, vec![
///     LineItem::new(ProductId::new(2), 4),
///     LineItem::new(ProductId::new(1), 2),
/// ]);
/// ```
pub fn merge_line_items(items: Vec<LineItem>) -> Vec<LineItem> {
    let mut merged: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }
    merged
}

/// Where the lines of a new order come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    /// The user's stored cart, in stored order.
    Cart,
    /// Caller-supplied lines, already merged.
    Explicit(Vec<LineItem>),
}

/// Everything a repository needs to place an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub user_id: UserId,
    pub source: LineSource,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
}

/// Locked product state read inside the checkout transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStock {
    pub product_id: ProductId,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
}

/// Why a set of line items cannot be turned into an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutRejection {
    NoLines,
    InvalidQuantity {
        product_id: ProductId,
        quantity: i32,
    },
    ProductNotFound {
        product_id: ProductId,
    },
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: i32,
        requested: i32,
    },
}

impl fmt::Display for CheckoutRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLines => write!(f, "no line items to order"),
            Self::InvalidQuantity {
                product_id,
                quantity,
            } => write!(
                f,
                "quantity for product {product_id} must be at least 1, got {quantity}"
            ),
            Self::ProductNotFound { product_id } => write!(f, "product {product_id} not found"),
            Self::InsufficientStock {
                product_name,
                available,
                requested,
                ..
            } => write!(
                f,
                "insufficient stock for {product_name}: available {available}, requested {requested}"
            ),
        }
    }
}

impl std::error::Error for CheckoutRejection {}

/// Validated line ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    /// Product stock after this line is applied.
    pub remaining_stock: i32,
}

impl PlannedLine {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

/// Fully validated order: lines in input order plus the server-side total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    lines: Vec<PlannedLine>,
    total: BigDecimal,
}

impl CheckoutPlan {
    /// Validate `items` against `products` and compute the order.
    ///
    /// `items` must already be merged (one entry per product). Every line is
    /// checked before the plan is returned; the first failing line in input
    /// order determines the rejection.
    pub fn build(
        items: &[LineItem],
        products: &[ProductStock],
    ) -> Result<Self, CheckoutRejection> {
        if items.is_empty() {
            return Err(CheckoutRejection::NoLines);
        }
        let by_id: HashMap<ProductId, &ProductStock> =
            products.iter().map(|p| (p.product_id, p)).collect();

        let mut lines = Vec::with_capacity(items.len());
        let mut total = BigDecimal::zero();
        for item in items {
            if item.quantity < 1 {
                return Err(CheckoutRejection::InvalidQuantity {
                    product_id: item.product_id,
                    quantity: item.quantity,
                });
            }
            let product = by_id
                .get(&item.product_id)
                .ok_or(CheckoutRejection::ProductNotFound {
                    product_id: item.product_id,
                })?;
            if product.stock < item.quantity {
                return Err(CheckoutRejection::InsufficientStock {
                    product_id: product.product_id,
                    product_name: product.name.clone(),
                    available: product.stock,
                    requested: item.quantity,
                });
            }
            let line = PlannedLine {
                product_id: product.product_id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                unit_price: product.price.clone(),
                remaining_stock: product.stock - item.quantity,
            };
            total += line.subtotal();
            lines.push(line);
        }
        Ok(Self { lines, total })
    }

    pub fn lines(&self) -> &[PlannedLine] {
        &self.lines
    }

    pub fn total(&self) -> &BigDecimal {
        &self.total
    }

    pub fn into_parts(self) -> (Vec<PlannedLine>, BigDecimal) {
        (self.lines, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn dec(raw: &str) -> BigDecimal {
        raw.parse().expect("decimal literal")
    }

    #[fixture]
    fn products() -> Vec<ProductStock> {
        vec![
            ProductStock {
                product_id: ProductId::new(1),
                name: "Kestane Bal".to_owned(),
                price: dec("65.00"),
                stock: 12,
            },
            ProductStock {
                product_id: ProductId::new(2),
                name: "Elma Sirkesi".to_owned(),
                price: dec("45.50"),
                stock: 1,
            },
        ]
    }

    #[rstest]
    fn totals_every_line(products: Vec<ProductStock>) {
        let items = [
            LineItem::new(ProductId::new(1), 3),
            LineItem::new(ProductId::new(2), 1),
        ];
        let plan = CheckoutPlan::build(&items, &products).expect("plan");
        assert_eq!(plan.total(), &dec("240.50"));
        let sum = plan
            .lines()
            .iter()
            .fold(BigDecimal::zero(), |acc, l| acc + l.subtotal());
        assert_eq!(&sum, plan.total());
        assert_eq!(plan.lines()[0].remaining_stock, 9);
        assert_eq!(plan.lines()[1].remaining_stock, 0);
    }

    #[rstest]
    fn rejects_whole_set_when_any_line_is_short(products: Vec<ProductStock>) {
        let items = [
            LineItem::new(ProductId::new(1), 13),
            LineItem::new(ProductId::new(2), 1),
        ];
        let err = CheckoutPlan::build(&items, &products).expect_err("short stock");
        assert_eq!(
            err,
            CheckoutRejection::InsufficientStock {
                product_id: ProductId::new(1),
                product_name: "Kestane Bal".to_owned(),
                available: 12,
                requested: 13,
            }
        );
        assert!(err.to_string().contains("Kestane Bal"));
    }

    #[rstest]
    #[case(vec![], CheckoutRejection::NoLines)]
    #[case(
        vec![LineItem::new(ProductId::new(9), 1)],
        CheckoutRejection::ProductNotFound { product_id: ProductId::new(9) }
    )]
    #[case(
        vec![LineItem::new(ProductId::new(1), 0)],
        CheckoutRejection::InvalidQuantity { product_id: ProductId::new(1), quantity: 0 }
    )]
    fn rejects_invalid_input(
        products: Vec<ProductStock>,
        #[case] items: Vec<LineItem>,
        #[case] expected: CheckoutRejection,
    ) {
        assert_eq!(
            CheckoutPlan::build(&items, &products).expect_err("invalid"),
            expected
        );
    }

    #[test]
    fn merge_keeps_first_seen_order() {
        let merged = merge_line_items(vec![
            LineItem::new(ProductId::new(3), 1),
            LineItem::new(ProductId::new(3), 2),
        ]);
        assert_eq!(merged, vec![LineItem::new(ProductId::new(3), 3)]);
    }
}
