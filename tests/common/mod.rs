//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use loja_api::http_server::{HttpServer, HttpServerConfig};
use loja_api::store::{MemoryStore, Store};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Router over a fresh in-memory store
pub fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn Store> = store.clone();
    let router = HttpServer::new(dyn_store, HttpServerConfig::default()).router();
    (router, store)
}

/// Send one request and decode the JSON body (`Value::Null` when empty)
pub async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Send a raw (possibly malformed) JSON body
pub async fn send_raw(router: &Router, method: &str, uri: &str, raw: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(raw.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub fn customer_body(name: &str) -> Value {
    json!({
        "nome": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "cpf": "123.456.789-00",
        "senha": "segredo123"
    })
}

pub fn product_body(name: &str, price: f64, stock: i64) -> Value {
    json!({
        "nome": name,
        "descrição": format!("{} de teste", name),
        "preco": price,
        "qtd_em_estoque": stock,
        "fornecedor_id": 1,
        "custo_no_fornecedor": 10.5
    })
}

pub fn cart_body(product_id: i64, quantity: i64, customer_id: i64) -> Value {
    json!({
        "produto_id": product_id,
        "quantidade": quantity,
        "cliente_id": customer_id
    })
}

/// POST and return the new id, asserting 201
pub async fn create(router: &Router, uri: &str, body: Value) -> i64 {
    let (status, value) = send(router, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", value);
    value["id"].as_i64().unwrap()
}

/// Current stock of a product
pub async fn stock_of(router: &Router, product_id: i64) -> i64 {
    let (status, value) = send(router, "GET", &format!("/produtos/{}", product_id), None).await;
    assert_eq!(status, StatusCode::OK);
    value["qtd_em_estoque"].as_i64().unwrap()
}
