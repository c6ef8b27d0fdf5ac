//! Diesel table definitions.
//!
//! Must match `migrations/` exactly; regenerate with `diesel print-schema`
//! after a schema change.

diesel::table! {
    /// Registered accounts. `email` is unique and stored lowercase.
    users (id) {
        id -> Int8,
        email -> Varchar,
        password_hash -> Varchar,
        name -> Varchar,
        phone -> Nullable<Varchar>,
        address -> Nullable<Text>,
        /// `ADMIN` or `USER`.
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    categories (id) {
        id -> Int8,
        name -> Varchar,
        description -> Nullable<Text>,
        icon -> Nullable<Varchar>,
        active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sellable items. `stock` carries a `CHECK (stock >= 0)` constraint.
    products (id) {
        id -> Int8,
        name -> Varchar,
        price -> Numeric,
        description -> Nullable<Text>,
        image_url -> Nullable<Varchar>,
        stock -> Int4,
        active -> Bool,
        category_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (user, product); unique on that pair.
    cart_lines (id) {
        id -> Int8,
        user_id -> Int8,
        product_id -> Int8,
        quantity -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    orders (id) {
        id -> Int8,
        user_id -> Int8,
        ordered_at -> Timestamptz,
        /// Canonical status token, or a legacy value awaiting migration.
        status -> Varchar,
        total_amount -> Numeric,
    }
}

diesel::table! {
    /// Lines of a placed order with the unit price captured at checkout.
    order_lines (id) {
        id -> Int8,
        order_id -> Int8,
        product_id -> Int8,
        quantity -> Int4,
        unit_price -> Numeric,
    }
}

diesel::joinable!(products -> categories (category_id));
diesel::joinable!(cart_lines -> users (user_id));
diesel::joinable!(cart_lines -> products (product_id));
diesel::joinable!(orders -> users (user_id));
diesel::joinable!(order_lines -> orders (order_id));
diesel::joinable!(order_lines -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    categories,
    products,
    cart_lines,
    orders,
    order_lines,
);
