//! Startup seeding: the admin account plus a starter catalog.
//!
//! The admin account is recreated on every start from the configured
//! credentials. Categories and products are only inserted into empty tables,
//! so seeding never overwrites catalog edits.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use mockable::Clock;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::ports::{
    CategoryPersistenceError, CategoryRepository, PasswordHashError, PasswordHasher,
    ProductPersistenceError, ProductRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CatalogValidationError, CategoryDraft, Email, NewUser, ProductDraft, Role,
    UserValidationError,
};

/// Errors returned while seeding the store.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid admin email: {0}")]
    AdminEmail(#[from] UserValidationError),
    #[error("failed to hash admin password: {0}")]
    Hash(#[from] PasswordHashError),
    #[error("user seeding failed: {0}")]
    Users(#[from] UserPersistenceError),
    #[error("category seeding failed: {0}")]
    Categories(#[from] CategoryPersistenceError),
    #[error("product seeding failed: {0}")]
    Products(#[from] ProductPersistenceError),
    #[error("seed data is invalid: {0}")]
    Catalog(#[from] CatalogValidationError),
}

/// Credentials of the account recreated at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub categories: usize,
    pub products: usize,
}

struct CategorySeed {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
}

const CATEGORIES: [CategorySeed; 6] = [
    CategorySeed { name: "Sirke", description: "Doğal fermente sirkeler", icon: "🍎" },
    CategorySeed { name: "Marmelat", description: "Ev yapımı marmelatlar", icon: "🍓" },
    CategorySeed { name: "Pekmez", description: "Geleneksel pekmezler", icon: "🍇" },
    CategorySeed { name: "Bal", description: "Doğal ve saf ballar", icon: "🍯" },
    CategorySeed { name: "Turşu", description: "Ev yapımı turşular", icon: "🥒" },
    CategorySeed { name: "Reçel", description: "Mevsim reçelleri", icon: "🫐" },
];

struct ProductSeed {
    name: &'static str,
    price: &'static str,
    description: &'static str,
    stock: i32,
    category: &'static str,
}

const PRODUCTS: [ProductSeed; 3] = [
    ProductSeed {
        name: "Elma Sirkesi",
        price: "45.00",
        description: "Ev yapımı doğal elma sirkesi, fermentasyon ile üretilmiştir.",
        stock: 25,
        category: "Sirke",
    },
    ProductSeed {
        name: "Çilek Marmelatı",
        price: "35.00",
        description: "Taze çileklerden yapılmış doğal marmelat, şeker oranı düşük.",
        stock: 18,
        category: "Marmelat",
    },
    ProductSeed {
        name: "Dut Pekmezi",
        price: "65.00",
        description: "Geleneksel yöntemlerle üretilmiş saf dut pekmezi.",
        stock: 12,
        category: "Pekmez",
    },
];

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Recreate the admin account and fill an empty catalog.
pub async fn seed_store<U, C, P>(
    users: &U,
    categories: &C,
    products: &P,
    hasher: &dyn PasswordHasher,
    clock: &dyn Clock,
    admin: &AdminSeed,
) -> Result<SeedOutcome, SeedError>
where
    U: UserRepository + ?Sized,
    C: CategoryRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    let account = users
        .upsert_by_email(&NewUser {
            email: Email::parse(&admin.email)?,
            name: "Admin".to_owned(),
            phone: Some("0555-123-4567".to_owned()),
            address: Some("Admin Address".to_owned()),
            role: Role::Admin,
            password_hash: hasher.hash(&admin.password)?,
        })
        .await?;
    info!(user_id = %account.id, email = %account.email, "admin account seeded");

    let mut outcome = SeedOutcome::default();
    let now = clock.utc();

    if categories.count().await? == 0 {
        for seed in &CATEGORIES {
            let draft = CategoryDraft::try_new(
                seed.name,
                Some(seed.description.to_owned()),
                Some(seed.icon.to_owned()),
                true,
            )?;
            categories.insert(&draft, now).await?;
            outcome.categories += 1;
        }
    }

    if products.count().await? == 0 {
        let known = categories.list_active().await?;
        for seed in &PRODUCTS {
            let Some(category) = known.iter().find(|c| c.name == seed.category) else {
                warn!(product = seed.name, category = seed.category, "seed category missing; skipping product");
                continue;
            };
            let price = BigDecimal::from_str(seed.price)
                .map_err(|_| CatalogValidationError::PriceScale)?;
            let draft = ProductDraft::try_new(
                seed.name,
                price,
                Some(seed.description.to_owned()),
                Some(PLACEHOLDER_IMAGE.to_owned()),
                seed.stock,
                true,
                category.id,
            )?;
            products.insert(&draft, now).await?;
            outcome.products += 1;
        }
    }

    info!(
        categories = outcome.categories,
        products = outcome.products,
        "catalog seeding finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductFilter;
    use crate::outbound::security::Argon2PasswordHasher;
    use crate::test_support::{InMemoryStore, MutableClock};
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> MutableClock {
        MutableClock::new(
            Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        )
    }

    fn admin() -> AdminSeed {
        AdminSeed {
            email: "admin@organikkose.com".to_owned(),
            password: "admin123".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn seeds_empty_store(clock: MutableClock) {
        let store = InMemoryStore::new();
        let hasher = Argon2PasswordHasher::new();
        let outcome = seed_store(&store, &store, &store, &hasher, &clock, &admin())
            .await
            .expect("seeding succeeds");
        assert_eq!(outcome, SeedOutcome { categories: 6, products: 3 });

        let mulberry = store
            .list(&ProductFilter::Search("Dut".to_owned()))
            .await
            .expect("list");
        assert_eq!(mulberry.len(), 1);
        assert_eq!(mulberry[0].stock, 12);
        assert_eq!(mulberry[0].category_name, "Pekmez");
        assert_eq!(mulberry[0].price.to_string(), "65.00");

        let stored = store
            .find_by_email(&Email::parse("admin@organikkose.com").expect("email"))
            .await
            .expect("lookup")
            .expect("admin exists");
        assert_eq!(stored.user.role, Role::Admin);
        assert!(hasher.verify("admin123", &stored.password_hash).expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn second_run_only_refreshes_admin(clock: MutableClock) {
        let store = InMemoryStore::new();
        let hasher = Argon2PasswordHasher::new();
        seed_store(&store, &store, &store, &hasher, &clock, &admin())
            .await
            .expect("first run");
        let rotated = AdminSeed {
            password: "rotated-secret".to_owned(),
            ..admin()
        };
        let outcome = seed_store(&store, &store, &store, &hasher, &clock, &rotated)
            .await
            .expect("second run");
        assert_eq!(outcome, SeedOutcome::default());

        let stored = store
            .find_by_email(&Email::parse("admin@organikkose.com").expect("email"))
            .await
            .expect("lookup")
            .expect("admin exists");
        assert!(hasher.verify("rotated-secret", &stored.password_hash).expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_malformed_admin_email(clock: MutableClock) {
        let store = InMemoryStore::new();
        let bad = AdminSeed {
            email: "not-an-email".to_owned(),
            ..admin()
        };
        let err = seed_store(&store, &store, &store, &Argon2PasswordHasher::new(), &clock, &bad)
            .await
            .expect_err("invalid email");
        assert!(matches!(err, SeedError::AdminEmail(_)));
    }
}
