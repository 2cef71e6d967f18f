//! Order HTTP Routes
//!
//! Orders are create/read only. `data_pedido` is stamped here, in UTC.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Timelike, Utc};
use serde_json::Value;

use crate::model::{parse_payload, ListQuery, Order, OrderPayload, Resource};

use super::common::{created, found, listing, ApiState, MessageResponse};
use super::errors::{store_failure, ApiError, ApiResult};

const RESOURCE: Resource = Resource::Order;

/// Create order routes, nested under `/pedidos`
pub fn order_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_orders_handler).post(create_order_handler))
        .route("/:id", get(get_order_handler))
        .route("/cliente/:id", get(list_customer_orders_handler))
        .with_state(state)
}

async fn create_order_handler(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(body) = body?;
    let order: OrderPayload = parse_payload(&body)?;
    // MySQL DATETIME has no sub-second part by default
    let placed_at = Utc::now()
        .naive_utc()
        .with_nanosecond(0)
        .unwrap_or_else(|| Utc::now().naive_utc());

    let id = state
        .store
        .create_order(&order, placed_at)
        .await
        .map_err(store_failure(RESOURCE, "cadastrar"))?;

    Ok(created(RESOURCE, id))
}

async fn get_order_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Order>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;

    let order = state
        .store
        .get_order(id)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    found(RESOURCE, order)
}

async fn list_orders_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let query = ListQuery::parse::<Order>(&params);

    let orders = state
        .store
        .list_orders(&query)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    listing(RESOURCE, orders)
}

async fn list_customer_orders_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let customer_id = ApiError::id_from_path(path, Resource::Customer)?;

    let orders = state
        .store
        .list_orders_by_customer(customer_id)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    listing(RESOURCE, orders)
}
