//! MySQL Store Integration Tests
//!
//! The same contract the in-memory tests check, run against `MySqlStore`.
//! All tests are marked with `#[ignore]` and need a reachable MySQL server.
//!
//! # Running the tests
//!
//! ```bash
//! docker run -d -p 3306:3306 -e MYSQL_ROOT_PASSWORD=root -e MYSQL_DATABASE=db_prep mysql:8
//!
//! DB_USER=root DB_PASSWORD=root cargo test --test mysql_store -- --ignored
//! ```
//!
//! # Requirements
//!
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` as for `serve`
//! - The user may create tables; missing tables are created on first use
//! - Use a scratch database: the created tables carry no foreign keys and
//!   the tests insert carts and orders for customers that do not exist
//!
//! Rows are never cleaned up. Each test tags its rows with a unique name or
//! customer id so runs do not see each other.

mod common;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use axum::Router;
use serde_json::Value;
use sqlx::mysql::MySqlPoolOptions;

use loja_api::config::{DatabaseConfig, EnvSource};
use loja_api::http_server::{HttpServer, HttpServerConfig};
use loja_api::store::{MySqlStore, Store};

use common::{cart_body, create, product_body, send, stock_of};

/// Far above any id a test run will generate
const UNKNOWN_ID: i64 = 2_000_000_000;

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS tbl_clientes (
        id INT AUTO_INCREMENT PRIMARY KEY,
        nome VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        cpf VARCHAR(20) NOT NULL,
        senha VARCHAR(255) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tbl_produtos (
        id INT AUTO_INCREMENT PRIMARY KEY,
        nome VARCHAR(255) NOT NULL,
        `descrição` VARCHAR(1024) NOT NULL,
        preco DECIMAL(10, 2) NOT NULL,
        qtd_em_estoque INT NOT NULL,
        fornecedor_id INT NOT NULL,
        custo_no_fornecedor DECIMAL(10, 2) NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tbl_carrinhos (
        id INT AUTO_INCREMENT PRIMARY KEY,
        produto_id INT NOT NULL,
        quantidade INT NOT NULL,
        cliente_id INT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tbl_pedidos (
        id INT AUTO_INCREMENT PRIMARY KEY,
        cliente_id INT NOT NULL,
        carrinho_id INT NOT NULL,
        data_pedido DATETIME NOT NULL,
        status VARCHAR(50) NOT NULL
    )",
];

// =============================================================================
// Test Fixtures
// =============================================================================

fn database_config() -> DatabaseConfig {
    DatabaseConfig::from_source(&EnvSource::from_process()).expect("invalid DB_* settings")
}

async fn ensure_schema(config: &DatabaseConfig) {
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect_with(config.connect_options().expect("DB_USER must be set"))
        .await
        .expect("MySQL unreachable");

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;
}

/// Router over a MySQL-backed store, schema in place
async fn mysql_app() -> (Router, Arc<MySqlStore>) {
    let config = database_config();
    ensure_schema(&config).await;

    let store = Arc::new(MySqlStore::connect_lazy(&config).unwrap());
    let dyn_store: Arc<dyn Store> = store.clone();
    let router = HttpServer::new(dyn_store, HttpServerConfig::default()).router();
    (router, store)
}

/// Unique per call; used as a name prefix or a customer id
fn unique_tag() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    (nanos % 1_000_000_000) as u64
}

async fn carts_of(router: &Router, customer_id: i64) -> usize {
    let (status, body) = send(router, "GET", &format!("/carrinhos/cliente/{}", customer_id), None).await;
    match status {
        StatusCode::OK => body["carrinhos"].as_array().map_or(0, Vec::len),
        StatusCode::NOT_FOUND => 0,
        other => panic!("unexpected status {}", other),
    }
}

fn ids(body: &Value, key: &str) -> Vec<i64> {
    body[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// Connectivity
// =============================================================================

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_ping_and_health() {
    let (router, store) = mysql_app().await;

    store.ping().await.unwrap();

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

// =============================================================================
// Cart Stock
// =============================================================================

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_cart_reserves_stock() {
    let (router, _store) = mysql_app().await;
    let customer = unique_tag() as i64;
    let product = create(&router, "/produtos", product_body("Caneca", 29.5, 10)).await;

    create(&router, "/carrinhos", cart_body(product, 5, customer)).await;

    assert_eq!(stock_of(&router, product).await, 5);
    assert_eq!(carts_of(&router, customer).await, 1);
}

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_over_stock_rolls_back() {
    let (router, _store) = mysql_app().await;
    let customer = unique_tag() as i64;
    let product = create(&router, "/produtos", product_body("Caneca", 29.5, 10)).await;

    let (status, body) = send(&router, "POST", "/carrinhos", Some(cart_body(product, 999, customer))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["erro"],
        "Quantidade solicitada excede o qtd_em_estoque disponível"
    );

    assert_eq!(stock_of(&router, product).await, 10);
    assert_eq!(carts_of(&router, customer).await, 0);
}

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_cart_for_unknown_product() {
    let (router, _store) = mysql_app().await;
    let customer = unique_tag() as i64;

    let (status, body) = send(&router, "POST", "/carrinhos", Some(cart_body(UNKNOWN_ID, 1, customer))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["erro"], "Produto não encontrado");
    assert_eq!(carts_of(&router, customer).await, 0);
}

/// Ten concurrent single-unit carts against three units of stock.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_concurrent_carts_never_oversell() {
    let (router, _store) = mysql_app().await;
    let customer = unique_tag() as i64;
    let product = create(&router, "/produtos", product_body("Caneca", 29.5, 3)).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            send(&router, "POST", "/carrinhos", Some(cart_body(product, 1, customer))).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => {}
            other => panic!("unexpected status {}: {}", other, body),
        }
    }

    assert_eq!(created, 3);
    assert_eq!(stock_of(&router, product).await, 0);
    assert_eq!(carts_of(&router, customer).await, 3);
}

// =============================================================================
// Update and Delete
// =============================================================================

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_update_and_delete_unknown_id() {
    let (router, _store) = mysql_app().await;
    let uri = format!("/produtos/{}", UNKNOWN_ID);

    let (status, body) = send(&router, "PUT", &uri, Some(product_body("Caneca", 1.0, 1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["erro"], "produto não encontrado");

    let (status, _) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_repeat_delete_is_not_found() {
    let (router, _store) = mysql_app().await;
    let product = create(&router, "/produtos", product_body("Caneca", 29.5, 1)).await;
    let uri = format!("/produtos/{}", product);

    let (status, _) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// MySQL reports zero changed rows when every value is the same.
#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_identical_update_is_still_found() {
    let (router, _store) = mysql_app().await;
    let body = product_body("Caneca", 29.5, 4);
    let product = create(&router, "/produtos", body.clone()).await;
    let uri = format!("/produtos/{}", product);

    for _ in 0..2 {
        let (status, response) = send(&router, "PUT", &uri, Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["mensagem"], "produto atualizado com sucesso!");
    }
}

// =============================================================================
// Columns and Listing
// =============================================================================

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_product_columns_roundtrip() {
    let (router, _store) = mysql_app().await;
    let product = create(&router, "/produtos", product_body("Caneca", 29.5, 7)).await;

    let (status, body) = send(&router, "GET", &format!("/produtos/{}", product), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["descrição"], "Caneca de teste");
    assert_eq!(body["preco"], 29.5);
    assert_eq!(body["custo_no_fornecedor"], 10.5);
    assert_eq!(body["qtd_em_estoque"], 7);
}

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_list_ties_break_by_id() {
    let (router, _store) = mysql_app().await;
    let tag = format!("lista{}", unique_tag());

    let cheap = create(&router, "/produtos", product_body(&format!("{} a", tag), 5.0, 1)).await;
    let first = create(&router, "/produtos", product_body(&format!("{} b", tag), 9.0, 1)).await;
    let second = create(&router, "/produtos", product_body(&format!("{} c", tag), 9.0, 1)).await;

    let (status, body) = send(&router, "GET", &format!("/produtos?nome={}&ordenar_por=preco", tag), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "produtos"), vec![cheap, first, second]);

    let (status, body) = send(
        &router,
        "GET",
        &format!("/produtos?nome={}&ordenar_por=preco&ordem=desc", tag),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "produtos"), vec![second, first, cheap]);
}

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_filter_wildcards_are_literal() {
    let (router, _store) = mysql_app().await;
    let tag = format!("curinga{}", unique_tag());
    let plain = create(&router, "/produtos", product_body(&format!("{}x", tag), 1.0, 1)).await;
    let percent = create(&router, "/produtos", product_body(&format!("{}%", tag), 1.0, 1)).await;

    // `%25` is an encoded `%`
    let (status, body) = send(&router, "GET", &format!("/produtos?nome={}%25", tag), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "produtos"), vec![percent]);

    let (status, body) = send(&router, "GET", &format!("/produtos?nome={}_", tag), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "unexpected rows: {}", body);

    let (status, body) = send(&router, "GET", &format!("/produtos?nome={}", tag), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "produtos"), vec![plain, percent]);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
#[ignore = "requires MySQL; set DB_* and run with --ignored"]
async fn test_order_timestamp_roundtrip() {
    let (router, _store) = mysql_app().await;
    let customer = unique_tag() as i64;

    let order = create(
        &router,
        "/pedidos",
        serde_json::json!({ "cliente_id": customer, "carrinho_id": 1, "status": "pendente" }),
    )
    .await;

    let (status, body) = send(&router, "GET", &format!("/pedidos/cliente/{}", customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body, "pedidos"), vec![order]);
    assert!(body["pedidos"][0]["data_pedido"].is_string());
}
