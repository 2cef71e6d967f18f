//! Cart line (`tbl_carrinhos`)

use serde::{Deserialize, Serialize};

use super::{Listable, Payload, SortKey, ValidationError};

/// Stored cart line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: i64,
    #[serde(rename = "produto_id")]
    #[sqlx(rename = "produto_id")]
    pub product_id: i64,
    #[serde(rename = "quantidade")]
    #[sqlx(rename = "quantidade")]
    pub quantity: i64,
    #[serde(rename = "cliente_id")]
    #[sqlx(rename = "cliente_id")]
    pub customer_id: i64,
}

/// Body of POST/PUT `/carrinhos`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartPayload {
    #[serde(rename = "produto_id")]
    pub product_id: i64,
    #[serde(rename = "quantidade")]
    pub quantity: i64,
    #[serde(rename = "cliente_id")]
    pub customer_id: i64,
}

impl Payload for CartPayload {
    const REQUIRED: &'static [&'static str] = &["produto_id", "quantidade", "cliente_id"];

    fn check(&self) -> Result<(), ValidationError> {
        if self.quantity <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantidade",
                reason: "deve ser maior que zero",
            });
        }
        Ok(())
    }
}

impl CartPayload {
    pub fn into_cart(self, id: i64) -> Cart {
        Cart {
            id,
            product_id: self.product_id,
            quantity: self.quantity,
            customer_id: self.customer_id,
        }
    }
}

impl Listable for Cart {
    const FILTER_PARAM: &'static str = "produto_id";
    const SORT_COLUMNS: &'static [&'static str] = &["id", "produto_id", "quantidade", "cliente_id"];

    fn filter_text(&self) -> String {
        self.product_id.to_string()
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "produto_id" => SortKey::Int(self.product_id),
            "quantidade" => SortKey::Int(self.quantity),
            "cliente_id" => SortKey::Int(self.customer_id),
            _ => SortKey::Int(self.id),
        }
    }
}
