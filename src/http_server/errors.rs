//! # API Errors
//!
//! Every failure is turned into `{"erro": "..."}` with a status code at the
//! handler boundary.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::crypto::CryptoError;
use crate::model::{Resource, ValidationError};
use crate::observability::Logger;
use crate::store::StoreError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Message for any connectivity failure; backend detail is only logged
pub const CONNECTION_ERROR_MESSAGE: &str = "Erro ao conectar com o banco de dados";

/// Handler errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Required field missing, wrong type, or malformed body
    #[error("{0}")]
    Validation(String),

    /// No row with the requested id (or empty listing)
    #[error("{0}")]
    NotFound(String),

    /// Cart quantity exceeds stock
    #[error("Quantidade solicitada excede o qtd_em_estoque disponível")]
    InsufficientStock { requested: i64, available: i64 },

    /// Known path, unsupported verb
    #[error("Método não permitido")]
    MethodNotAllowed,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Database unreachable
    #[error("Erro ao conectar com o banco de dados")]
    Connection,

    /// Statement failed; the message includes the driver error
    #[error("{0}")]
    Execution(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Connection => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// "cliente não encontrado"
    pub fn not_found(resource: Resource) -> Self {
        ApiError::NotFound(format!("{} não encontrado", resource.singular()))
    }

    /// "Nenhum cliente encontrado"
    pub fn empty(resource: Resource) -> Self {
        ApiError::NotFound(format!("Nenhum {} encontrado", resource.singular()))
    }

    /// Parse a numeric path id; anything else is treated as an unknown row
    pub fn id_from_path(
        path: Result<axum::extract::Path<i64>, PathRejection>,
        resource: Resource,
    ) -> ApiResult<i64> {
        path.map(|axum::extract::Path(id)| id)
            .map_err(|_| Self::not_found(resource))
    }
}

/// Map a store failure to an API error, logging backend detail.
///
/// `action` is the verb used in the message: "Erro ao {action} {resource}".
pub fn store_failure(resource: Resource, action: &'static str) -> impl Fn(StoreError) -> ApiError {
    move |err| match err {
        StoreError::Connection(detail) => {
            Logger::error(
                "STORE_ERROR",
                &[
                    ("action", action),
                    ("kind", "connection"),
                    ("message", detail.as_str()),
                    ("resource", resource.singular()),
                ],
            );
            ApiError::Connection
        }
        StoreError::NotFound { resource: missing, .. } => {
            ApiError::NotFound(format!("{} não encontrado", capitalize(missing.singular())))
        }
        StoreError::InsufficientStock {
            requested,
            available,
        } => ApiError::InsufficientStock {
            requested,
            available,
        },
        StoreError::Execution(message) => {
            Logger::error(
                "STORE_ERROR",
                &[
                    ("action", action),
                    ("kind", "execution"),
                    ("message", message.as_str()),
                    ("resource", resource.singular()),
                ],
            );
            ApiError::Execution(format!(
                "Erro ao {} {}: {}",
                action,
                resource.singular(),
                message
            ))
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Dados inválidos: {}", rejection.body_text()))
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        Logger::error("PASSWORD_HASH_FAILED", &[("message", err.to_string().as_str())]);
        ApiError::Execution(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub erro: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            erro: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientStock {
                requested: 2,
                available: 1
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found(Resource::Cart).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Connection.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Execution("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::not_found(Resource::Customer).to_string(), "cliente não encontrado");
        assert_eq!(ApiError::empty(Resource::Order).to_string(), "Nenhum pedido encontrado");
        assert_eq!(ApiError::Connection.to_string(), CONNECTION_ERROR_MESSAGE);
    }

    #[test]
    fn test_store_failure_mapping() {
        let map = store_failure(Resource::Cart, "processar");

        let err = map(StoreError::NotFound {
            resource: Resource::Product,
            id: 1,
        });
        assert_eq!(err.to_string(), "Produto não encontrado");

        let err = map(StoreError::Execution("Unknown column 'x'".to_string()));
        assert_eq!(err.to_string(), "Erro ao processar carrinho: Unknown column 'x'");

        let err = map(StoreError::Connection("timed out".to_string()));
        assert!(matches!(err, ApiError::Connection));
        assert!(!err.to_string().contains("timed out"));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err = ApiError::from(ValidationError::MissingFields(vec!["nome".to_string()]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("nome"));
    }
}
