// src/handlers/crud.rs

// Handlers genéricos de cadastro. Cada entidade monta suas rotas com
// `resource_routes::<R>()` e o serviço certo sai do AppState via FromRef.

use axum::{
    Json, Router,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    db::resource::Resource,
    query::ListQuery,
    services::CrudService,
};

// GET /api/<entidade>
pub async fn list<R: Resource>(
    State(service): State<CrudService<R>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<R::Row>>, AppError> {
    let Query(query) = query?;
    let page = service.get_all(&query).await?;
    Ok(ApiResponse::page(page))
}

// GET /api/<entidade>/export
pub async fn export<R: Resource>(
    State(service): State<CrudService<R>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<R::Export>>, AppError> {
    let Query(query) = query?;
    Ok(ApiResponse::ok(service.export(&query).await?))
}

// GET /api/<entidade>/{id}
pub async fn get_one<R: Resource>(
    State(service): State<CrudService<R>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<R::Row>, AppError> {
    Ok(ApiResponse::ok(service.get_by_id(&id).await?))
}

// POST /api/<entidade>
pub async fn create<R: Resource>(
    State(service): State<CrudService<R>>,
    payload: Result<Json<R::Create>, JsonRejection>,
) -> Result<(StatusCode, ApiResponse<R::Row>), AppError> {
    let Json(payload) = payload?;
    let row = service.create(payload).await?;
    let body = ApiResponse::ok(row).with_message(format!("{} created successfully", R::ENTITY));
    Ok((StatusCode::CREATED, body))
}

// PATCH /api/<entidade>/{id}
pub async fn update<R: Resource>(
    State(service): State<CrudService<R>>,
    Path(id): Path<String>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<ApiResponse<R::Row>, AppError> {
    let Json(patch) = payload?;
    let row = service.update(&id, patch).await?;
    Ok(ApiResponse::ok(row).with_message(format!("{} updated successfully", R::ENTITY)))
}

// DELETE /api/<entidade>/{id}
pub async fn remove<R: Resource>(
    State(service): State<CrudService<R>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(&id).await?;
    Ok(ApiResponse::done(format!("{} deleted successfully", R::ENTITY)))
}

/// Rotas padrão de uma entidade (lista, criação, exportação e item).
pub fn resource_routes<R: Resource>() -> Router<AppState>
where
    CrudService<R>: FromRef<AppState>,
{
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/export", get(export::<R>))
        .route("/{id}", get(get_one::<R>).patch(update::<R>).delete(remove::<R>))
}
