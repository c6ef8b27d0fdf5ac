//! Product handlers.
//!
//! ```text
//! GET /api/products?category=4
//! GET /api/products?search=pekmez
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::catalog_service::validation_error;
use crate::domain::{
    CategoryId, Error, Patch, Product, ProductDraft, ProductFilter, ProductId, ProductPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AdminIdentity;
use crate::inbound::http::money::{MoneyInput, format_money};
use crate::inbound::http::state::HttpState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i64,
    #[schema(example = "Dut Pekmezi")]
    pub name: String,
    #[schema(example = "65.00")]
    pub price: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub stock: i32,
    pub active: bool,
    pub category_id: i64,
    #[schema(example = "Pekmez")]
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.get(),
            price: format_money(&product.price),
            name: product.name,
            description: product.description,
            image_url: product.image_url,
            stock: product.stock,
            active: product.active,
            category_id: product.category_id.get(),
            category_name: product.category_name,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Listing filters. `category` wins when both are supplied.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductsQuery {
    /// Only products of this category.
    pub category: Option<i64>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
}

impl ProductsQuery {
    fn into_filter(self) -> ProductFilter {
        if let Some(id) = self.category {
            return ProductFilter::Category(CategoryId::new(id));
        }
        match self.search {
            Some(term) if !term.trim().is_empty() => ProductFilter::Search(term.trim().to_owned()),
            _ => ProductFilter::Active,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[schema(value_type = String, example = "65.00")]
    pub price: MoneyInput,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    pub category_id: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub price: Patch<MoneyInput>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub image_url: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub stock: Patch<i32>,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub active: Patch<bool>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub category_id: Patch<i64>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(body: UpdateProductRequest) -> Self {
        Self {
            name: body.name,
            price: body.price.map(|price| price.0),
            description: body.description,
            image_url: body.image_url,
            stock: body.stock,
            active: body.active,
            category_id: body.category_id.map(CategoryId::new),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductsQuery),
    responses(
        (status = 200, description = "Active products by id", body = [ProductView]),
        (status = 400, description = "Invalid query", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductsQuery>,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    let products = state
        .catalog
        .list_products(&query.into_inner().into_filter())
        .await?;
    Ok(web::Json(products.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductView),
        (status = 404, description = "Unknown product", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "getProduct",
    security([])
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ProductView>> {
    let product = state
        .catalog
        .get_product(ProductId::new(path.into_inner()))
        .await?;
    Ok(web::Json(product.into()))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown category", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    payload: web::Json<CreateProductRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = ProductDraft::try_new(
        &body.name,
        body.price.0,
        body.description,
        body.image_url,
        body.stock,
        body.active,
        CategoryId::new(body.category_id),
    )
    .map_err(validation_error)?;
    let product = state.catalog_admin.create_product(draft).await?;
    Ok(HttpResponse::Created().json(ProductView::from(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown product or category", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateProductRequest>,
) -> ApiResult<web::Json<ProductView>> {
    let product = state
        .catalog_admin
        .update_product(ProductId::new(path.into_inner()), payload.into_inner().into())
        .await?;
    Ok(web::Json(product.into()))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 409, description = "Product appears in orders", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .catalog_admin
        .delete_product(ProductId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
