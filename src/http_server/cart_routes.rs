//! Cart HTTP Routes
//!
//! Creating a cart reserves stock: the product's `qtd_em_estoque` is
//! decremented by the cart quantity in the same unit of work that inserts
//! the cart line. Update and delete leave stock untouched.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::model::{parse_payload, Cart, CartPayload, ListQuery, Resource};
use crate::observability::Logger;

use super::common::{created, found, listing, removed, updated, ApiState, MessageResponse};
use super::errors::{store_failure, ApiError, ApiResult};

const RESOURCE: Resource = Resource::Cart;

/// Create cart routes, nested under `/carrinhos`
pub fn cart_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_carts_handler).post(create_cart_handler))
        .route(
            "/:id",
            get(get_cart_handler)
                .put(update_cart_handler)
                .delete(delete_cart_handler),
        )
        .route("/cliente/:id", get(list_customer_carts_handler))
        .with_state(state)
}

async fn create_cart_handler(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(body) = body?;
    let cart: CartPayload = parse_payload(&body)?;

    let id = state
        .store
        .create_cart(&cart)
        .await
        .map_err(store_failure(RESOURCE, "processar"))?;

    Logger::info(
        "STOCK_RESERVED",
        &[
            ("carrinho_id", id.to_string().as_str()),
            ("produto_id", cart.product_id.to_string().as_str()),
            ("quantidade", cart.quantity.to_string().as_str()),
        ],
    );

    Ok(created(RESOURCE, id))
}

async fn get_cart_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Cart>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;

    let cart = state
        .store
        .get_cart(id)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    found(RESOURCE, cart)
}

async fn list_carts_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let query = ListQuery::parse::<Cart>(&params);

    let carts = state
        .store
        .list_carts(&query)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    listing(RESOURCE, carts)
}

async fn list_customer_carts_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let customer_id = ApiError::id_from_path(path, Resource::Customer)?;

    let carts = state
        .store
        .list_carts_by_customer(customer_id)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    listing(RESOURCE, carts)
}

async fn update_cart_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;
    let Json(body) = body?;
    let cart: CartPayload = parse_payload(&body)?;

    let matched = state
        .store
        .update_cart(id, &cart)
        .await
        .map_err(store_failure(RESOURCE, "atualizar"))?;

    updated(RESOURCE, matched)
}

async fn delete_cart_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;

    let existed = state
        .store
        .delete_cart(id)
        .await
        .map_err(store_failure(RESOURCE, "remover"))?;

    removed(RESOURCE, existed)
}
