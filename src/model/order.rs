//! Order (`tbl_pedidos`)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Listable, Payload, SortKey};

/// Stored order. `data_pedido` is UTC, set by the server on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "cliente_id")]
    #[sqlx(rename = "cliente_id")]
    pub customer_id: i64,
    #[serde(rename = "carrinho_id")]
    #[sqlx(rename = "carrinho_id")]
    pub cart_id: i64,
    #[serde(rename = "data_pedido")]
    #[sqlx(rename = "data_pedido")]
    pub placed_at: NaiveDateTime,
    pub status: String,
}

/// Body of POST `/pedidos`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderPayload {
    #[serde(rename = "cliente_id")]
    pub customer_id: i64,
    #[serde(rename = "carrinho_id")]
    pub cart_id: i64,
    pub status: String,
}

impl Payload for OrderPayload {
    const REQUIRED: &'static [&'static str] = &["cliente_id", "carrinho_id", "status"];
}

impl OrderPayload {
    pub fn into_order(self, id: i64, placed_at: NaiveDateTime) -> Order {
        Order {
            id,
            customer_id: self.customer_id,
            cart_id: self.cart_id,
            placed_at,
            status: self.status,
        }
    }
}

impl Listable for Order {
    const FILTER_PARAM: &'static str = "status";
    const SORT_COLUMNS: &'static [&'static str] = &["id", "cliente_id", "data_pedido", "status"];

    fn filter_text(&self) -> String {
        self.status.clone()
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "cliente_id" => SortKey::Int(self.customer_id),
            "data_pedido" => SortKey::Time(self.placed_at),
            "status" => SortKey::Text(self.status.clone()),
            _ => SortKey::Int(self.id),
        }
    }
}
