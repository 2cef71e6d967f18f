//! Shared state and response bodies for the resource routers.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::Resource;
use crate::store::Store;

use super::errors::{ApiError, ApiResult};

/// State shared by every handler
pub struct ApiState {
    pub store: Arc<dyn Store>,
}

impl ApiState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// `{"mensagem": ..., "id": ...}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub mensagem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// 201 `{"mensagem": "<entidade> cadastrado com sucesso", "id": <id>}`
pub fn created(resource: Resource, id: i64) -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::CREATED,
        Json(MessageResponse {
            mensagem: format!("{} cadastrado com sucesso", resource.singular()),
            id: Some(id),
        }),
    )
}

/// 200 `{"mensagem": "<entidade> atualizado com sucesso!"}`, or 404 when no row matched
pub fn updated(resource: Resource, matched: bool) -> ApiResult<Json<MessageResponse>> {
    if !matched {
        return Err(ApiError::not_found(resource));
    }
    Ok(Json(MessageResponse {
        mensagem: format!("{} atualizado com sucesso!", resource.singular()),
        id: None,
    }))
}

/// 200 `{"mensagem": "<entidade> removido com sucesso"}`, or 404 when absent
pub fn removed(resource: Resource, existed: bool) -> ApiResult<Json<MessageResponse>> {
    if !existed {
        return Err(ApiError::not_found(resource));
    }
    Ok(Json(MessageResponse {
        mensagem: format!("{} removido com sucesso", resource.singular()),
        id: None,
    }))
}

/// 200 with the row, or 404
pub fn found<T: Serialize>(resource: Resource, row: Option<T>) -> ApiResult<Json<T>> {
    row.map(Json).ok_or_else(|| ApiError::not_found(resource))
}

/// 200 `{"<colecao>": [...]}`; an empty listing is 404
pub fn listing<T: Serialize>(resource: Resource, rows: Vec<T>) -> ApiResult<Json<Value>> {
    if rows.is_empty() {
        return Err(ApiError::empty(resource));
    }

    let rows = serde_json::to_value(rows)
        .map_err(|e| ApiError::Execution(format!("Erro ao serializar {}: {}", resource.collection(), e)))?;

    let mut body = Map::new();
    body.insert(resource.collection().to_string(), rows);
    Ok(Json(Value::Object(body)))
}
