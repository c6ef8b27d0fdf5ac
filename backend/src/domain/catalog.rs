//! Categories and products.
//!
//! Drafts carry the complete set of writable fields; patches resolve against
//! a stored entity into a draft so adapters only ever persist whole rows.

use std::fmt;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patch::{Patch, RequiredFieldCleared};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(
    /// Database identifier of a category.
    CategoryId
);
id_newtype!(
    /// Database identifier of a product.
    ProductId
);

/// Validation failures for catalog drafts and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValidationError {
    EmptyName,
    NegativePrice,
    PriceScale,
    NegativeStock,
    RequiredFieldCleared(&'static str),
}

impl CatalogValidationError {
    /// Name of the offending payload field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::NegativePrice | Self::PriceScale => "price",
            Self::NegativeStock => "stock",
            Self::RequiredFieldCleared(field) => field,
        }
    }
}

impl fmt::Display for CatalogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NegativePrice => write!(f, "price must not be negative"),
            Self::PriceScale => write!(f, "price must have at most two decimal places"),
            Self::NegativeStock => write!(f, "stock must not be negative"),
            Self::RequiredFieldCleared(field) => write!(f, "{field} cannot be cleared"),
        }
    }
}

impl std::error::Error for CatalogValidationError {}

impl From<RequiredFieldCleared> for CatalogValidationError {
    fn from(value: RequiredFieldCleared) -> Self {
        Self::RequiredFieldCleared(value.0)
    }
}

fn validate_name(raw: &str) -> Result<String, CatalogValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CatalogValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

/// Normalise a price to two fractional digits.
///
/// # Examples
/// ```
/// use bigdecimal::BigDecimal;
/// use std::str::FromStr;
/// use storefront::domain::validate_price;
///
/// let price = validate_price(BigDecimal::from_str("65").unwrap()).unwrap();
/// assert_eq!(price.to_string(), "65.00");
/// assert!(validate_price(BigDecimal::from_str("1.005").unwrap()).is_err());
/// ```
pub fn validate_price(price: BigDecimal) -> Result<BigDecimal, CatalogValidationError> {
    if price < BigDecimal::zero() {
        return Err(CatalogValidationError::NegativePrice);
    }
    let scaled = price.with_scale(2);
    if scaled != price {
        return Err(CatalogValidationError::PriceScale);
    }
    Ok(scaled)
}

fn validate_stock(stock: i32) -> Result<i32, CatalogValidationError> {
    if stock < 0 {
        return Err(CatalogValidationError::NegativeStock);
    }
    Ok(stock)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Product grouping shown in the storefront navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Writable category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub active: bool,
}

impl CategoryDraft {
    pub fn try_new(
        name: &str,
        description: Option<String>,
        icon: Option<String>,
        active: bool,
    ) -> Result<Self, CatalogValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            description: blank_to_none(description),
            icon: blank_to_none(icon),
            active,
        })
    }
}

/// Partial category update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Patch<String>,
    pub description: Patch<String>,
    pub icon: Patch<String>,
    pub active: Patch<bool>,
}

impl CategoryPatch {
    /// Resolve the patch against the stored category.
    pub fn apply(self, current: &Category) -> Result<CategoryDraft, CatalogValidationError> {
        let name = self.name.apply_required(current.name.clone(), "name")?;
        CategoryDraft::try_new(
            &name,
            self.description.apply_nullable(current.description.clone()),
            self.icon.apply_nullable(current.icon.clone()),
            self.active.apply_required(current.active, "active")?,
        )
    }
}

/// Sellable item.
///
/// `category_name` is resolved by lookup when the product is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: BigDecimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub stock: i32,
    pub active: bool,
    pub category_id: CategoryId,
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable product fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub price: BigDecimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub stock: i32,
    pub active: bool,
    pub category_id: CategoryId,
}

impl ProductDraft {
    pub fn try_new(
        name: &str,
        price: BigDecimal,
        description: Option<String>,
        image_url: Option<String>,
        stock: i32,
        active: bool,
        category_id: CategoryId,
    ) -> Result<Self, CatalogValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            price: validate_price(price)?,
            description: blank_to_none(description),
            image_url: blank_to_none(image_url),
            stock: validate_stock(stock)?,
            active,
            category_id,
        })
    }
}

/// Partial product update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Patch<String>,
    pub price: Patch<BigDecimal>,
    pub description: Patch<String>,
    pub image_url: Patch<String>,
    pub stock: Patch<i32>,
    pub active: Patch<bool>,
    pub category_id: Patch<CategoryId>,
}

impl ProductPatch {
    /// Resolve the patch against the stored product.
    pub fn apply(self, current: &Product) -> Result<ProductDraft, CatalogValidationError> {
        let name = self.name.apply_required(current.name.clone(), "name")?;
        ProductDraft::try_new(
            &name,
            self.price.apply_required(current.price.clone(), "price")?,
            self.description.apply_nullable(current.description.clone()),
            self.image_url.apply_nullable(current.image_url.clone()),
            self.stock.apply_required(current.stock, "stock")?,
            self.active.apply_required(current.active, "active")?,
            self.category_id
                .apply_required(current.category_id, "categoryId")?,
        )
    }
}

/// Product listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProductFilter {
    /// Every active product.
    #[default]
    Active,
    /// Active products of one category.
    Category(CategoryId),
    /// Active products whose name or description contains the term,
    /// ignoring case.
    Search(String),
}
