//! Customer (`tbl_clientes`)

use serde::{Deserialize, Serialize};

use super::{Listable, Payload, SortKey};

/// Stored customer.
///
/// The password column holds an Argon2id hash and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    #[serde(rename = "nome")]
    #[sqlx(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "cpf")]
    #[sqlx(rename = "cpf")]
    pub national_id: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "senha")]
    pub password_hash: String,
}

/// Body of POST/PUT `/clientes`
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerPayload {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "cpf")]
    pub national_id: String,
    #[serde(rename = "senha")]
    pub password: String,
}

impl Payload for CustomerPayload {
    const REQUIRED: &'static [&'static str] = &["nome", "email", "cpf", "senha"];
}

impl CustomerPayload {
    /// Swap the plaintext password for its hash
    pub fn into_write(self, password_hash: String) -> CustomerWrite {
        CustomerWrite {
            name: self.name,
            email: self.email,
            national_id: self.national_id,
            password_hash,
        }
    }
}

/// Column values written by insert/update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerWrite {
    pub name: String,
    pub email: String,
    pub national_id: String,
    pub password_hash: String,
}

impl CustomerWrite {
    pub fn into_customer(self, id: i64) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            national_id: self.national_id,
            password_hash: self.password_hash,
        }
    }
}

impl Listable for Customer {
    const FILTER_PARAM: &'static str = "nome";
    const SORT_COLUMNS: &'static [&'static str] = &["id", "nome", "email"];

    fn filter_text(&self) -> String {
        self.name.clone()
    }

    fn sort_key(&self, column: &str) -> SortKey {
        match column {
            "nome" => SortKey::Text(self.name.clone()),
            "email" => SortKey::Text(self.email.clone()),
            _ => SortKey::Int(self.id),
        }
    }
}
