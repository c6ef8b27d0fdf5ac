//! Category handlers. Reads are public; writes need the admin role.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog_service::validation_error;
use crate::domain::{Category, CategoryDraft, CategoryId, CategoryPatch, Error, Patch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AdminIdentity;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: i64,
    #[schema(example = "Bal")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "🍯")]
    pub icon: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.get(),
            name: category.name,
            description: category.description,
            icon: category.icon,
            active: category.active,
            created_at: category.created_at,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Partial update; omitted fields are kept and `null` clears nullable ones.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub icon: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub active: Patch<bool>,
}

impl From<UpdateCategoryRequest> for CategoryPatch {
    fn from(body: UpdateCategoryRequest) -> Self {
        Self {
            name: body.name,
            description: body.description,
            icon: body.icon,
            active: body.active,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Active categories by name", body = [CategoryView]),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<CategoryView>>> {
    let categories = state.catalog.list_categories().await?;
    Ok(web::Json(categories.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = CategoryView),
        (status = 404, description = "Unknown category", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "getCategory",
    security([])
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<CategoryView>> {
    let category = state
        .catalog
        .get_category(CategoryId::new(path.into_inner()))
        .await?;
    Ok(web::Json(category.into()))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Name already used", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    payload: web::Json<CreateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = CategoryDraft::try_new(&body.name, body.description, body.icon, body.active)
        .map_err(validation_error)?;
    let category = state.catalog_admin.create_category(draft).await?;
    Ok(HttpResponse::Created().json(CategoryView::from(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown category", body = Error),
        (status = 409, description = "Name already used", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id}")]
pub async fn update_category(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UpdateCategoryRequest>,
) -> ApiResult<web::Json<CategoryView>> {
    let category = state
        .catalog_admin
        .update_category(CategoryId::new(path.into_inner()), payload.into_inner().into())
        .await?;
    Ok(web::Json(category.into()))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown category", body = Error),
        (status = 409, description = "Category still has products", body = Error)
    ),
    tags = ["catalog"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    _admin: AdminIdentity,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .catalog_admin
        .delete_category(CategoryId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
