//! Shared wiring for the in-memory integration suites.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::{TimeZone, Utc};
use zeroize::Zeroizing;

use storefront::domain::ports::{AuthCommand, CatalogCommand, PasswordHasher, TokenCodec};
use storefront::domain::{
    AuthService, CartService, CatalogService, Category, CategoryDraft, CheckoutService, Identity,
    OrderService, Product, ProductDraft, Registration, Role, User,
};
use storefront::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};
use storefront::test_support::{InMemoryStore, MutableClock};

pub type Catalog = CatalogService<InMemoryStore, InMemoryStore>;
pub type Cart = CartService<InMemoryStore, InMemoryStore, InMemoryStore>;

/// Real services sharing one in-memory store and a fixed clock.
pub struct Shop {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<MutableClock>,
    pub tokens: Arc<JwtTokenCodec>,
    pub auth: Arc<AuthService<InMemoryStore>>,
    pub catalog: Arc<Catalog>,
    pub cart: Arc<Cart>,
    pub checkout: Arc<CheckoutService<InMemoryStore>>,
    pub orders: Arc<OrderService<InMemoryStore>>,
}

impl Shop {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
                .single()
                .expect("valid timestamp"),
        ));
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
        let tokens = Arc::new(JwtTokenCodec::new(
            Zeroizing::new(b"integration-secret".to_vec()),
            Duration::from_secs(3600),
            clock.clone(),
        ));
        let codec: Arc<dyn TokenCodec> = tokens.clone();
        Self {
            auth: Arc::new(AuthService::new(store.clone(), hasher, codec)),
            catalog: Arc::new(CatalogService::new(
                store.clone(),
                store.clone(),
                clock.clone(),
            )),
            cart: Arc::new(CartService::new(store.clone(), store.clone(), store.clone())),
            checkout: Arc::new(CheckoutService::new(store.clone(), clock.clone())),
            orders: Arc::new(OrderService::new(store.clone())),
            store,
            clock,
            tokens,
        }
    }

    pub async fn shopper(&self, email: &str) -> User {
        let registration = Registration::try_new(email, "secret-pass", "Ayşe Yılmaz", None, None)
            .expect("valid registration");
        self.auth
            .register(&registration)
            .await
            .expect("registration succeeds")
            .user
    }

    pub async fn category(&self, name: &str) -> Category {
        let draft = CategoryDraft::try_new(name, None, None, true).expect("valid category");
        self.catalog
            .create_category(draft)
            .await
            .expect("category created")
    }

    pub async fn product(&self, category: &Category, name: &str, price: &str, stock: i32) -> Product {
        let draft = ProductDraft::try_new(
            name,
            price.parse::<BigDecimal>().expect("decimal price"),
            None,
            None,
            stock,
            true,
            category.id,
        )
        .expect("valid product");
        self.catalog
            .create_product(draft)
            .await
            .expect("product created")
    }
}

pub fn identity_of(user: &User) -> Identity {
    Identity {
        user_id: user.id,
        email: user.email.as_str().to_owned(),
        role: user.role,
    }
}

pub fn admin_identity() -> Identity {
    Identity {
        user_id: storefront::domain::UserId::new(9_999),
        email: "admin@organikkose.com".to_owned(),
        role: Role::Admin,
    }
}

pub fn money(raw: &str) -> BigDecimal {
    raw.parse().expect("decimal")
}
