//! Domain entities and request payloads
//!
//! Entities map 1:1 to the MySQL tables. Field names are English in Rust;
//! the serde and sqlx renames carry the column/JSON names used on the wire.

mod cart;
mod customer;
mod order;
mod product;
mod query;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use cart::{Cart, CartPayload};
pub use customer::{Customer, CustomerPayload, CustomerWrite};
pub use order::{Order, OrderPayload};
pub use product::{Product, ProductPayload};
pub use query::{Listable, ListQuery, SortKey, SortOrder};

/// The four resources exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Customer,
    Product,
    Cart,
    Order,
}

impl Resource {
    /// Singular name used in messages ("cliente")
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Customer => "cliente",
            Resource::Product => "produto",
            Resource::Cart => "carrinho",
            Resource::Order => "pedido",
        }
    }

    /// Collection key used in list responses ("clientes")
    pub fn collection(&self) -> &'static str {
        match self {
            Resource::Customer => "clientes",
            Resource::Product => "produtos",
            Resource::Cart => "carrinhos",
            Resource::Order => "pedidos",
        }
    }

    /// Backing table
    pub fn table(&self) -> &'static str {
        match self {
            Resource::Customer => "tbl_clientes",
            Resource::Product => "tbl_produtos",
            Resource::Cart => "tbl_carrinhos",
            Resource::Order => "tbl_pedidos",
        }
    }
}

/// Request payload rejected before any statement runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body is not a JSON object
    #[error("Dados inválidos, o corpo da requisição deve ser um objeto JSON")]
    NotAnObject,

    /// One or more required fields absent (or null)
    #[error("Dados inválidos, verifique se os dados necessários foram fornecidos: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Field present but of the wrong type
    #[error("Dados inválidos: {0}")]
    Malformed(String),

    /// Field well typed but outside the accepted range
    #[error("Dados inválidos: {field} {reason}")]
    OutOfRange {
        field: &'static str,
        reason: &'static str,
    },
}

/// Required field names and their validation
pub trait Payload: DeserializeOwned {
    /// JSON keys that must be present and non-null
    const REQUIRED: &'static [&'static str];

    /// Range checks after deserialization
    fn check(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Check presence of every required field, then deserialize and range-check
pub fn parse_payload<P: Payload>(body: &Value) -> Result<P, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<String> = P::REQUIRED
        .iter()
        .filter(|field| object.get(**field).map_or(true, Value::is_null))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let payload: P = serde_json::from_value(body.clone())
        .map_err(|e| ValidationError::Malformed(e.to_string()))?;
    payload.check()?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_names() {
        assert_eq!(Resource::Customer.singular(), "cliente");
        assert_eq!(Resource::Product.collection(), "produtos");
        assert_eq!(Resource::Cart.table(), "tbl_carrinhos");
        assert_eq!(Resource::Order.collection(), "pedidos");
    }

    #[test]
    fn test_missing_fields_listed_in_order() {
        let err = parse_payload::<CartPayload>(&json!({"quantidade": 1})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["produto_id".to_string(), "cliente_id".to_string()])
        );
        assert!(err.to_string().contains("produto_id, cliente_id"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = parse_payload::<CartPayload>(&json!({
            "produto_id": 1,
            "quantidade": null,
            "cliente_id": 2
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["quantidade".to_string()]));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_payload::<CartPayload>(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err = parse_payload::<CartPayload>(&json!({
            "produto_id": "abc",
            "quantidade": 1,
            "cliente_id": 2
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }
}
