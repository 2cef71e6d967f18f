//! Product HTTP Routes

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::model::{parse_payload, ListQuery, Product, ProductPayload, Resource};

use super::common::{created, found, listing, removed, updated, ApiState, MessageResponse};
use super::errors::{store_failure, ApiError, ApiResult};

const RESOURCE: Resource = Resource::Product;

/// Create product routes, nested under `/produtos`
pub fn product_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_products_handler).post(create_product_handler))
        .route(
            "/:id",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
        .with_state(state)
}

async fn create_product_handler(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(body) = body?;
    let product: ProductPayload = parse_payload(&body)?;

    let id = state
        .store
        .create_product(&product)
        .await
        .map_err(store_failure(RESOURCE, "cadastrar"))?;

    Ok(created(RESOURCE, id))
}

async fn get_product_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Product>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;

    let product = state
        .store
        .get_product(id)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    found(RESOURCE, product)
}

async fn list_products_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let query = ListQuery::parse::<Product>(&params);

    let products = state
        .store
        .list_products(&query)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    listing(RESOURCE, products)
}

async fn update_product_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;
    let Json(body) = body?;
    let product: ProductPayload = parse_payload(&body)?;

    let matched = state
        .store
        .update_product(id, &product)
        .await
        .map_err(store_failure(RESOURCE, "atualizar"))?;

    updated(RESOURCE, matched)
}

async fn delete_product_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;

    let existed = state
        .store
        .delete_product(id)
        .await
        .map_err(store_failure(RESOURCE, "remover"))?;

    removed(RESOURCE, existed)
}
