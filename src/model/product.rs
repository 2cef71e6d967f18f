//! Product (`tbl_produtos`)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Listable, Payload, SortKey, ValidationError};

/// Stored product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "nome")]
    #[sqlx(rename = "nome")]
    pub name: String,
    #[serde(rename = "descrição")]
    #[sqlx(rename = "descrição")]
    pub description: String,
    #[serde(rename = "preco", with = "rust_decimal::serde::float")]
    #[sqlx(rename = "preco")]
    pub price: Decimal,
    #[serde(rename = "qtd_em_estoque")]
    #[sqlx(rename = "qtd_em_estoque")]
    pub stock: i64,
    #[serde(rename = "fornecedor_id")]
    #[sqlx(rename = "fornecedor_id")]
    pub supplier_id: i64,
    #[serde(rename = "custo_no_fornecedor", with = "rust_decimal::serde::float")]
    #[sqlx(rename = "custo_no_fornecedor")]
    pub supplier_cost: Decimal,
}

/// Body of POST/PUT `/produtos`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductPayload {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descrição")]
    pub description: String,
    #[serde(rename = "preco", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "qtd_em_estoque")]
    pub stock: i64,
    #[serde(rename = "fornecedor_id")]
    pub supplier_id: i64,
    #[serde(rename = "custo_no_fornecedor", with = "rust_decimal::serde::float")]
    pub supplier_cost: Decimal,
}

impl Payload for ProductPayload {
    const REQUIRED: &'static [&'static str] = &[
        "nome",
        "descrição",
        "preco",
        "qtd_em_estoque",
        "fornecedor_id",
        "custo_no_fornecedor",
    ];

    fn check(&self) -> Result<(), ValidationError> {
        if self.stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "qtd_em_estoque",
                reason: "não pode ser negativo",
            });
        }
        Ok(())
    }
}

impl ProductPayload {
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            supplier_id: self.supplier_id,
            supplier_cost: self.supplier_cost,
        }
    }
}

impl Listable for Product {
    const FILTER_PARAM: &'static str = "nome";
    const SORT_COLUMNS: &'static [&'static str] = &["id", "nome", "preco", "qtd_em_estoque"];

    fn filter_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "nome" => SortKey::Text(self.name.clone()),
            "preco" => SortKey::Decimal(self.price),
            "qtd_em_estoque" => SortKey::Int(self.stock),
            _ => SortKey::Int(self.id),
        }
    }
}
