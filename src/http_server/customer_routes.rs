//! Customer HTTP Routes
//!
//! `/clientes` CRUD. Passwords are hashed before they reach the store.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::crypto::hash_password_blocking;
use crate::model::{parse_payload, Customer, CustomerPayload, CustomerWrite, ListQuery, Resource};

use super::common::{created, found, listing, removed, updated, ApiState, MessageResponse};
use super::errors::{store_failure, ApiError, ApiResult};

const RESOURCE: Resource = Resource::Customer;

/// Create customer routes, nested under `/clientes`
pub fn customer_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_customers_handler).post(create_customer_handler))
        .route(
            "/:id",
            get(get_customer_handler)
                .put(update_customer_handler)
                .delete(delete_customer_handler),
        )
        .with_state(state)
}

async fn customer_write(body: Result<Json<Value>, JsonRejection>) -> ApiResult<CustomerWrite> {
    let Json(body) = body?;
    let mut payload: CustomerPayload = parse_payload(&body)?;
    let password = std::mem::take(&mut payload.password);
    let hash = hash_password_blocking(password).await?;
    Ok(payload.into_write(hash))
}

async fn create_customer_handler(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let customer = customer_write(body).await?;

    let id = state
        .store
        .create_customer(&customer)
        .await
        .map_err(store_failure(RESOURCE, "cadastrar"))?;

    Ok(created(RESOURCE, id))
}

async fn get_customer_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Customer>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;

    let customer = state
        .store
        .get_customer(id)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    found(RESOURCE, customer)
}

async fn list_customers_handler(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let query = ListQuery::parse::<Customer>(&params);

    let customers = state
        .store
        .list_customers(&query)
        .await
        .map_err(store_failure(RESOURCE, "buscar"))?;

    listing(RESOURCE, customers)
}

async fn update_customer_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;
    let customer = customer_write(body).await?;

    let matched = state
        .store
        .update_customer(id, &customer)
        .await
        .map_err(store_failure(RESOURCE, "atualizar"))?;

    updated(RESOURCE, matched)
}

async fn delete_customer_handler(
    State(state): State<Arc<ApiState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = ApiError::id_from_path(path, RESOURCE)?;

    let existed = state
        .store
        .delete_customer(id)
        .await
        .map_err(store_failure(RESOURCE, "remover"))?;

    removed(RESOURCE, existed)
}
