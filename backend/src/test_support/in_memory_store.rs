//! Mutex-guarded store implementing every repository port.
//!
//! Each operation takes the lock once, so checkout is as all-or-nothing here
//! as it is inside a database transaction. Constraint failures surface as the
//! same port errors the Diesel adapters produce.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CartPersistenceError, CartRepository, CategoryPersistenceError, CategoryRepository,
    OrderPersistenceError, OrderRepository, ProductPersistenceError, ProductRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    CartItem, CartLine, Category, CategoryDraft, CategoryId, CheckoutPlan, Email, LineItem,
    LineSource, NewUser, Order, OrderId, OrderLine, OrderStatus, PlaceOrder, Product,
    ProductDraft, ProductFilter, ProductId, ProductStock, StoredUser, User, UserId,
};

#[derive(Debug, Clone)]
struct StoredOrderLine {
    id: i64,
    product_id: ProductId,
    quantity: i32,
    unit_price: BigDecimal,
}

#[derive(Debug, Clone)]
struct StoredOrder {
    id: OrderId,
    user_id: UserId,
    ordered_at: DateTime<Utc>,
    status: String,
    total_amount: BigDecimal,
    lines: Vec<StoredOrderLine>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, StoredUser>,
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, Product>,
    cart_lines: BTreeMap<i64, CartLine>,
    orders: BTreeMap<i64, StoredOrder>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn product_view(&self, product: &Product) -> Product {
        let mut view = product.clone();
        if let Some(category) = self.categories.get(&product.category_id.get()) {
            view.category_name.clone_from(&category.name);
        }
        view
    }

    fn cart_item(&self, line: &CartLine) -> Option<CartItem> {
        let product = self.products.get(&line.product_id.get())?;
        Some(CartItem {
            line_id: line.id,
            quantity: line.quantity,
            product: self.product_view(product),
        })
    }

    fn order_view(&self, order: &StoredOrder) -> Order {
        let user_name = self
            .users
            .get(&order.user_id.get())
            .map(|stored| stored.user.name.clone())
            .unwrap_or_default();
        Order {
            id: order.id,
            user_id: order.user_id,
            user_name,
            ordered_at: order.ordered_at,
            status: OrderStatus::from_stored(&order.status),
            total_amount: order.total_amount.clone(),
            lines: order
                .lines
                .iter()
                .map(|line| OrderLine {
                    id: line.id,
                    product_id: line.product_id,
                    product_name: self
                        .products
                        .get(&line.product_id.get())
                        .map(|product| product.name.clone())
                        .unwrap_or_default(),
                    quantity: line.quantity,
                    unit_price: line.unit_price.clone(),
                })
                .collect(),
        }
    }

    fn orders_newest_first<'a>(
        &self,
        orders: impl Iterator<Item = &'a StoredOrder>,
    ) -> Vec<Order> {
        let mut selected: Vec<&StoredOrder> = orders.collect();
        selected.sort_by(|a, b| (b.ordered_at, b.id).cmp(&(a.ordered_at, a.id)));
        selected.into_iter().map(|order| self.order_view(order)).collect()
    }
}

/// Shared in-memory storage; clones observe the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current stock of a product, if it exists.
    pub fn stock_of(&self, id: ProductId) -> Option<i32> {
        self.state().products.get(&id.get()).map(|p| p.stock)
    }

    /// Number of persisted orders across all users.
    pub fn order_count(&self) -> usize {
        self.state().orders.len()
    }

    /// Overwrite a stored status verbatim, bypassing the vocabulary.
    pub fn set_raw_status(&self, id: OrderId, raw: &str) {
        if let Some(order) = self.state().orders.get_mut(&id.get()) {
            order.status = raw.to_owned();
        }
    }

    /// Stored status text exactly as persisted.
    pub fn raw_status(&self, id: OrderId) -> Option<String> {
        self.state().orders.get(&id.get()).map(|o| o.status.clone())
    }
}

fn user_from_new(id: i64, new_user: &NewUser) -> StoredUser {
    StoredUser {
        user: User {
            id: UserId::new(id),
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            phone: new_user.phone.clone(),
            address: new_user.address.clone(),
            role: new_user.role,
        },
        password_hash: new_user.password_hash.clone(),
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.state().users.get(&id.get()).map(|s| s.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        Ok(self
            .state()
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.state();
        if state.users.values().any(|s| s.user.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_str()));
        }
        let id = state.allocate_id();
        let stored = user_from_new(id, user);
        let view = stored.user.clone();
        state.users.insert(id, stored);
        Ok(view)
    }

    async fn upsert_by_email(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.state();
        let existing = state
            .users
            .values()
            .find(|s| s.user.email == user.email)
            .map(|s| s.user.id.get());
        let id = match existing {
            Some(id) => id,
            None => state.allocate_id(),
        };
        let stored = user_from_new(id, user);
        let view = stored.user.clone();
        state.users.insert(id, stored);
        Ok(view)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list_active(&self) -> Result<Vec<Category>, CategoryPersistenceError> {
        let mut active: Vec<Category> = self
            .state()
            .categories
            .values()
            .filter(|c| c.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(active)
    }

    async fn find_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        Ok(self.state().categories.get(&id.get()).cloned())
    }

    async fn insert(
        &self,
        draft: &CategoryDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Category, CategoryPersistenceError> {
        let mut state = self.state();
        if state.categories.values().any(|c| c.name == draft.name) {
            return Err(CategoryPersistenceError::duplicate_name(draft.name.clone()));
        }
        let id = state.allocate_id();
        let category = Category {
            id: CategoryId::new(id),
            name: draft.name.clone(),
            description: draft.description.clone(),
            icon: draft.icon.clone(),
            active: draft.active,
            created_at,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        let mut state = self.state();
        if state
            .categories
            .values()
            .any(|c| c.name == draft.name && c.id != id)
        {
            return Err(CategoryPersistenceError::duplicate_name(draft.name.clone()));
        }
        let Some(category) = state.categories.get_mut(&id.get()) else {
            return Ok(None);
        };
        category.name.clone_from(&draft.name);
        category.description.clone_from(&draft.description);
        category.icon.clone_from(&draft.icon);
        category.active = draft.active;
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, CategoryPersistenceError> {
        let mut state = self.state();
        if state.products.values().any(|p| p.category_id == id) {
            return Err(CategoryPersistenceError::in_use(id.get()));
        }
        Ok(state.categories.remove(&id.get()).is_some())
    }

    async fn count(&self) -> Result<i64, CategoryPersistenceError> {
        Ok(i64::try_from(self.state().categories.len()).unwrap_or(i64::MAX))
    }
}

fn matches_filter(product: &Product, filter: &ProductFilter) -> bool {
    if !product.active {
        return false;
    }
    match filter {
        ProductFilter::Active => true,
        ProductFilter::Category(id) => product.category_id == *id,
        ProductFilter::Search(term) => {
            let needle = term.trim().to_lowercase();
            product.name.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ProductPersistenceError> {
        let state = self.state();
        Ok(state
            .products
            .values()
            .filter(|p| matches_filter(p, filter))
            .map(|p| state.product_view(p))
            .collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductPersistenceError> {
        let state = self.state();
        Ok(state.products.get(&id.get()).map(|p| state.product_view(p)))
    }

    async fn insert(
        &self,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Product, ProductPersistenceError> {
        let mut state = self.state();
        if !state.categories.contains_key(&draft.category_id.get()) {
            return Err(ProductPersistenceError::category_missing(draft.category_id.get()));
        }
        let id = state.allocate_id();
        let product = Product {
            id: ProductId::new(id),
            name: draft.name.clone(),
            price: draft.price.clone(),
            description: draft.description.clone(),
            image_url: draft.image_url.clone(),
            stock: draft.stock,
            active: draft.active,
            category_id: draft.category_id,
            category_name: String::new(),
            created_at: now,
            updated_at: now,
        };
        state.products.insert(id, product.clone());
        Ok(state.product_view(&product))
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductPersistenceError> {
        let mut state = self.state();
        if !state.products.contains_key(&id.get()) {
            return Ok(None);
        }
        if !state.categories.contains_key(&draft.category_id.get()) {
            return Err(ProductPersistenceError::category_missing(draft.category_id.get()));
        }
        let Some(product) = state.products.get_mut(&id.get()) else {
            return Ok(None);
        };
        product.name.clone_from(&draft.name);
        product.price.clone_from(&draft.price);
        product.description.clone_from(&draft.description);
        product.image_url.clone_from(&draft.image_url);
        product.stock = draft.stock;
        product.active = draft.active;
        product.category_id = draft.category_id;
        product.updated_at = now;
        let updated = product.clone();
        Ok(Some(state.product_view(&updated)))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, ProductPersistenceError> {
        let mut state = self.state();
        let ordered = state
            .orders
            .values()
            .flat_map(|o| o.lines.iter())
            .any(|line| line.product_id == id);
        if ordered {
            return Err(ProductPersistenceError::ordered(id.get()));
        }
        let removed = state.products.remove(&id.get()).is_some();
        if removed {
            state.cart_lines.retain(|_, line| line.product_id != id);
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<i64, ProductPersistenceError> {
        Ok(i64::try_from(self.state().products.len()).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn list_items(&self, user_id: UserId) -> Result<Vec<CartItem>, CartPersistenceError> {
        let state = self.state();
        Ok(state
            .cart_lines
            .values()
            .filter(|line| line.user_id == user_id)
            .filter_map(|line| state.cart_item(line))
            .collect())
    }

    async fn find_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>, CartPersistenceError> {
        Ok(self
            .state()
            .cart_lines
            .values()
            .find(|line| line.user_id == user_id && line.product_id == product_id)
            .copied())
    }

    async fn save_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, CartPersistenceError> {
        let mut state = self.state();
        let existing = state
            .cart_lines
            .values_mut()
            .find(|line| line.user_id == user_id && line.product_id == product_id);
        let line = match existing {
            Some(line) => {
                line.quantity = quantity;
                *line
            }
            None => {
                let id = state.allocate_id();
                let line = CartLine {
                    id,
                    user_id,
                    product_id,
                    quantity,
                };
                state.cart_lines.insert(id, line);
                line
            }
        };
        state
            .cart_item(&line)
            .ok_or_else(|| CartPersistenceError::query(format!("product {product_id} missing")))
    }

    async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, CartPersistenceError> {
        let mut state = self.state();
        let before = state.cart_lines.len();
        state
            .cart_lines
            .retain(|_, line| !(line.user_id == user_id && line.product_id == product_id));
        Ok(state.cart_lines.len() < before)
    }

    async fn clear(&self, user_id: UserId) -> Result<usize, CartPersistenceError> {
        let mut state = self.state();
        let before = state.cart_lines.len();
        state.cart_lines.retain(|_, line| line.user_id != user_id);
        Ok(before - state.cart_lines.len())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn place_order(&self, request: &PlaceOrder) -> Result<Order, OrderPersistenceError> {
        let mut state = self.state();
        let user_id = request.user_id;
        if !state.users.contains_key(&user_id.get()) {
            return Err(OrderPersistenceError::user_not_found(user_id.get()));
        }

        let items: Vec<LineItem> = match &request.source {
            LineSource::Explicit(items) => items.clone(),
            LineSource::Cart => state
                .cart_lines
                .values()
                .filter(|line| line.user_id == user_id)
                .map(|line| LineItem::new(line.product_id, line.quantity))
                .collect(),
        };
        let stock: Vec<ProductStock> = items
            .iter()
            .filter_map(|item| state.products.get(&item.product_id.get()))
            .map(|product| ProductStock {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price.clone(),
                stock: product.stock,
            })
            .collect();
        let plan =
            CheckoutPlan::build(&items, &stock).map_err(OrderPersistenceError::rejected)?;

        let (planned, total_amount) = plan.into_parts();
        let mut lines = Vec::with_capacity(planned.len());
        for line in planned {
            if let Some(product) = state.products.get_mut(&line.product_id.get()) {
                product.stock = line.remaining_stock;
            }
            lines.push(StoredOrderLine {
                id: state.allocate_id(),
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }
        let id = state.allocate_id();
        let order = StoredOrder {
            id: OrderId::new(id),
            user_id,
            ordered_at: request.placed_at,
            status: request.status.as_str().to_owned(),
            total_amount,
            lines,
        };
        state.orders.insert(id, order.clone());
        state.cart_lines.retain(|_, line| line.user_id != user_id);
        Ok(state.order_view(&order))
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        let state = self.state();
        Ok(state.orders_newest_first(state.orders.values()))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderPersistenceError> {
        let state = self.state();
        Ok(state.orders_newest_first(state.orders.values().filter(|o| o.user_id == user_id)))
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        let state = self.state();
        Ok(state.orders.get(&id.get()).map(|o| state.order_view(o)))
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut state = self.state();
        let Some(order) = state.orders.get_mut(&id.get()) else {
            return Ok(None);
        };
        order.status = status.as_str().to_owned();
        let order = order.clone();
        Ok(Some(state.order_view(&order)))
    }

    async fn migrate_statuses(&self) -> Result<u64, OrderPersistenceError> {
        let mut state = self.state();
        let mut changed = 0;
        for order in state.orders.values_mut() {
            if let Some(status) = OrderStatus::migrate_legacy(&order.status) {
                order.status = status.as_str().to_owned();
                changed += 1;
            }
        }
        Ok(changed)
    }
}
