//! Orders, order lines, and the order status lifecycle.

use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::ProductId;
use super::user::UserId;

/// Database identifier of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed order status vocabulary.
///
/// The usual progression is `new → preparing → shipped → delivered`, with
/// `cancelled` as a terminal branch. Updates are not held to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Raised when a status token is outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOrderStatus(pub String);

impl fmt::Display for UnknownOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown order status {:?}; expected one of new, preparing, shipped, delivered, cancelled",
            self.0
        )
    }
}

impl std::error::Error for UnknownOrderStatus {}

impl OrderStatus {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Preparing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Status assigned to freshly placed orders.
    pub const INITIAL: Self = Self::Preparing;

    /// Canonical token stored in `orders.status` and used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Preparing => "preparing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    const fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Preparing => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
            Self::Cancelled => 4,
        }
    }

    /// Whether moving to `next` follows the usual lifecycle.
    ///
    /// Re-asserting the current status counts as following it. Forward moves
    /// may skip intermediate states; terminal states lead nowhere else. The
    /// table is advisory: status updates overwrite regardless and only log
    /// moves that leave it.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::OrderStatus;
    ///
    /// assert!(OrderStatus::Preparing.follows_lifecycle(OrderStatus::Shipped));
    /// assert!(OrderStatus::Shipped.follows_lifecycle(OrderStatus::Cancelled));
    /// assert!(!OrderStatus::Shipped.follows_lifecycle(OrderStatus::Preparing));
    /// assert!(!OrderStatus::Delivered.follows_lifecycle(OrderStatus::Cancelled));
    /// ```
    pub const fn follows_lifecycle(self, next: Self) -> bool {
        if self.rank() == next.rank() {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Cancelled => true,
            _ => next.rank() > self.rank(),
        }
    }

    /// Map a stored value onto the canonical vocabulary.
    ///
    /// Returns `None` when `raw` is already canonical, so callers can skip
    /// untouched rows. Legacy English tokens compare case-insensitively;
    /// legacy display labels map to their canonical state; anything else is
    /// treated as an order still being prepared.
    pub fn migrate_legacy(raw: &str) -> Option<Self> {
        if Self::ALL.iter().any(|status| status.as_str() == raw) {
            return None;
        }
        let trimmed = raw.trim();
        let migrated = match trimmed.to_uppercase().as_str() {
            "NEW" => Self::New,
            "PENDING" | "PROCESSING" | "PREPARING" => Self::Preparing,
            "SHIPPED" => Self::Shipped,
            "DELIVERED" => Self::Delivered,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            _ => match trimmed {
                "Yeni" => Self::New,
                "Hazırlanıyor" => Self::Preparing,
                "Kargoda" => Self::Shipped,
                "Teslim Edildi" => Self::Delivered,
                "İptal Edildi" => Self::Cancelled,
                _ => Self::Preparing,
            },
        };
        Some(migrated)
    }

    /// Read a stored value, interpreting legacy values as their migrated
    /// form so unmigrated rows still present a canonical status.
    pub fn from_stored(raw: &str) -> Self {
        Self::migrate_legacy(raw).unwrap_or_else(|| raw.parse().unwrap_or(Self::INITIAL))
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownOrderStatus(s.to_owned()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Committed line with the unit price captured at order time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub id: i64,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl OrderLine {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

/// Placed order with its lines.
///
/// `total_amount` is fixed at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub user_name: String,
    pub ordered_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub lines: Vec<OrderLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::New, OrderStatus::Preparing, true)]
    #[case(OrderStatus::New, OrderStatus::Delivered, true)]
    #[case(OrderStatus::Preparing, OrderStatus::Preparing, true)]
    #[case(OrderStatus::Shipped, OrderStatus::Delivered, true)]
    #[case(OrderStatus::New, OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Shipped, OrderStatus::New, false)]
    #[case(OrderStatus::Delivered, OrderStatus::Shipped, false)]
    #[case(OrderStatus::Delivered, OrderStatus::Cancelled, false)]
    #[case(OrderStatus::Cancelled, OrderStatus::Preparing, false)]
    #[case(OrderStatus::Cancelled, OrderStatus::Cancelled, true)]
    fn transition_table(
        #[case] from: OrderStatus,
        #[case] to: OrderStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.follows_lifecycle(to), allowed);
    }

    #[rstest]
    #[case("PENDING", Some(OrderStatus::Preparing))]
    #[case("processing", Some(OrderStatus::Preparing))]
    #[case("SHIPPED", Some(OrderStatus::Shipped))]
    #[case("DELIVERED", Some(OrderStatus::Delivered))]
    #[case("CANCELLED", Some(OrderStatus::Cancelled))]
    #[case("NEW", Some(OrderStatus::New))]
    #[case(" Preparing ", Some(OrderStatus::Preparing))]
    #[case("Canceled", Some(OrderStatus::Cancelled))]
    #[case("Kargoda", Some(OrderStatus::Shipped))]
    #[case("İptal Edildi", Some(OrderStatus::Cancelled))]
    #[case("something odd", Some(OrderStatus::Preparing))]
    #[case("shipped", None)]
    #[case("new", None)]
    fn legacy_migration(#[case] raw: &str, #[case] expected: Option<OrderStatus>) {
        assert_eq!(OrderStatus::migrate_legacy(raw), expected);
    }

    #[test]
    fn migrated_values_are_canonical() {
        for raw in ["PENDING", "Yeni", "Teslim Edildi", "???"] {
            let migrated = OrderStatus::migrate_legacy(raw).expect("legacy value");
            assert_eq!(OrderStatus::migrate_legacy(migrated.as_str()), None);
        }
    }

    #[test]
    fn stored_values_read_canonically() {
        assert_eq!(OrderStatus::from_stored("cancelled"), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::from_stored("Kargoda"), OrderStatus::Shipped);
    }

    #[test]
    fn parses_only_canonical_tokens() {
        assert_eq!("delivered".parse::<OrderStatus>(), Ok(OrderStatus::Delivered));
        assert!("DELIVERED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn line_subtotal_is_exact() {
        let line = OrderLine {
            id: 1,
            product_id: ProductId::new(1),
            product_name: "Bal".to_owned(),
            quantity: 3,
            unit_price: "65.00".parse().expect("decimal"),
        };
        assert_eq!(line.subtotal(), "195.00".parse::<BigDecimal>().expect("decimal"));
    }
}
