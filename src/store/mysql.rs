//! MySQL store backed by an sqlx connection pool.
//!
//! The pool connects lazily, so the server starts even when the database is
//! down; an unreachable backend surfaces per request as
//! `StoreError::Connection` once the acquire timeout elapses.
//!
//! Expected schema (owned outside this service):
//!
//! ```sql
//! tbl_clientes  (id, nome, email, cpf, senha)
//! tbl_produtos  (id, nome, `descrição`, preco, qtd_em_estoque, fornecedor_id, custo_no_fornecedor)
//! tbl_carrinhos (id, produto_id, quantidade, cliente_id)
//! tbl_pedidos   (id, cliente_id, carrinho_id, data_pedido, status)
//! ```

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlQueryResult};
use sqlx::pool::PoolConnection;
use sqlx::MySql;

use crate::config::{ConfigError, DatabaseConfig};
use crate::model::{
    Cart, CartPayload, Customer, CustomerWrite, ListQuery, Order, OrderPayload, Product,
    ProductPayload, Resource,
};

use super::{Store, StoreError, StoreResult};

const CUSTOMER_COLUMNS: &str = "id, nome, email, cpf, senha";
const PRODUCT_COLUMNS: &str =
    "id, nome, `descrição`, preco, qtd_em_estoque, fornecedor_id, custo_no_fornecedor";
const CART_COLUMNS: &str = "id, produto_id, quantidade, cliente_id";
const ORDER_COLUMNS: &str = "id, cliente_id, carrinho_id, data_pedido, status";

/// MySQL backend
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Build a lazily connecting pool from `config`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, ConfigError> {
        let options = config.connect_options()?;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn connection(&self) -> StoreResult<PoolConnection<MySql>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    async fn row_exists(
        &self,
        conn: &mut PoolConnection<MySql>,
        resource: Resource,
        id: i64,
    ) -> StoreResult<bool> {
        let sql = format!("SELECT id FROM {} WHERE id = ?", resource.table());
        let found: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&mut **conn)
            .await?;
        Ok(found.is_some())
    }

    /// Rows matched by an UPDATE. MySQL reports changed rows, so a full
    /// replace with identical values is confirmed with a follow-up lookup.
    async fn confirm_update(
        &self,
        conn: &mut PoolConnection<MySql>,
        resource: Resource,
        id: i64,
        result: MySqlQueryResult,
    ) -> StoreResult<bool> {
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        self.row_exists(conn, resource, id).await
    }

    /// Select-then-delete
    async fn delete_row(&self, resource: Resource, id: i64) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        if !self.row_exists(&mut conn, resource, id).await? {
            return Ok(false);
        }

        let sql = format!("DELETE FROM {} WHERE id = ?", resource.table());
        sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
        Ok(true)
    }
}

fn inserted_id(result: MySqlQueryResult) -> StoreResult<i64> {
    i64::try_from(result.last_insert_id())
        .map_err(|_| StoreError::Execution("generated id out of range".to_string()))
}

/// `SELECT <columns> FROM <table> [WHERE <filter> LIKE ?] ORDER BY <col> <dir>[, id <dir>]`
///
/// `filter_column` and `query.sort_by` come from static allow-lists. Ties on
/// the sort column are broken by id, in the same direction.
fn list_sql(columns: &str, resource: Resource, filter_column: &str, query: &ListQuery) -> String {
    let mut sql = format!("SELECT {} FROM {}", columns, resource.table());
    if query.filter.is_some() {
        sql.push_str(&format!(" WHERE {} LIKE ? ESCAPE '{}'", filter_column, LIKE_ESCAPE));
    }
    let direction = query.order.as_sql();
    sql.push_str(&format!(" ORDER BY {} {}", query.sort_by, direction));
    if query.sort_by != "id" {
        sql.push_str(&format!(", id {}", direction));
    }
    sql
}

const LIKE_ESCAPE: char = '!';

/// `%<filter>%`, with the filter's own wildcards matched literally
fn like_pattern(query: &ListQuery) -> Option<String> {
    query.filter.as_ref().map(|filter| {
        let mut pattern = String::with_capacity(filter.len() + 2);
        pattern.push('%');
        for c in filter.chars() {
            if c == LIKE_ESCAPE || c == '%' || c == '_' {
                pattern.push(LIKE_ESCAPE);
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    })
}

#[async_trait]
impl Store for MySqlStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    // ==================
    // Customers
    // ==================

    async fn create_customer(&self, customer: &CustomerWrite) -> StoreResult<i64> {
        let mut conn = self.connection().await?;
        let result = sqlx::query(
            "INSERT INTO tbl_clientes (nome, email, cpf, senha) VALUES (?, ?, ?, ?)",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.national_id)
        .bind(&customer.password_hash)
        .execute(&mut *conn)
        .await?;
        inserted_id(result)
    }

    async fn get_customer(&self, id: i64) -> StoreResult<Option<Customer>> {
        let mut conn = self.connection().await?;
        let sql = format!("SELECT {} FROM tbl_clientes WHERE id = ?", CUSTOMER_COLUMNS);
        Ok(sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?)
    }

    async fn list_customers(&self, query: &ListQuery) -> StoreResult<Vec<Customer>> {
        let mut conn = self.connection().await?;
        let sql = list_sql(CUSTOMER_COLUMNS, Resource::Customer, "nome", query);
        let mut statement = sqlx::query_as::<_, Customer>(&sql);
        if let Some(pattern) = like_pattern(query) {
            statement = statement.bind(pattern);
        }
        Ok(statement.fetch_all(&mut *conn).await?)
    }

    async fn update_customer(&self, id: i64, customer: &CustomerWrite) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        let result = sqlx::query(
            "UPDATE tbl_clientes SET nome = ?, email = ?, cpf = ?, senha = ? WHERE id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.national_id)
        .bind(&customer.password_hash)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        self.confirm_update(&mut conn, Resource::Customer, id, result).await
    }

    async fn delete_customer(&self, id: i64) -> StoreResult<bool> {
        self.delete_row(Resource::Customer, id).await
    }

    // ==================
    // Products
    // ==================

    async fn create_product(&self, product: &ProductPayload) -> StoreResult<i64> {
        let mut conn = self.connection().await?;
        let result = sqlx::query(
            "INSERT INTO tbl_produtos (nome, `descrição`, preco, qtd_em_estoque, fornecedor_id, custo_no_fornecedor) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.supplier_id)
        .bind(product.supplier_cost)
        .execute(&mut *conn)
        .await?;
        inserted_id(result)
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        let mut conn = self.connection().await?;
        let sql = format!("SELECT {} FROM tbl_produtos WHERE id = ?", PRODUCT_COLUMNS);
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?)
    }

    async fn list_products(&self, query: &ListQuery) -> StoreResult<Vec<Product>> {
        let mut conn = self.connection().await?;
        let sql = list_sql(PRODUCT_COLUMNS, Resource::Product, "nome", query);
        let mut statement = sqlx::query_as::<_, Product>(&sql);
        if let Some(pattern) = like_pattern(query) {
            statement = statement.bind(pattern);
        }
        Ok(statement.fetch_all(&mut *conn).await?)
    }

    async fn update_product(&self, id: i64, product: &ProductPayload) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        let result = sqlx::query(
            "UPDATE tbl_produtos SET nome = ?, `descrição` = ?, preco = ?, qtd_em_estoque = ?, \
             fornecedor_id = ?, custo_no_fornecedor = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.supplier_id)
        .bind(product.supplier_cost)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        self.confirm_update(&mut conn, Resource::Product, id, result).await
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        self.delete_row(Resource::Product, id).await
    }

    // ==================
    // Carts
    // ==================

    async fn create_cart(&self, cart: &CartPayload) -> StoreResult<i64> {
        let mut conn = self.connection().await?;
        // Dropping `tx` without commit rolls back.
        let mut tx = sqlx::Connection::begin(&mut *conn).await?;

        let stock: Option<i64> =
            sqlx::query_scalar("SELECT qtd_em_estoque FROM tbl_produtos WHERE id = ? FOR UPDATE")
                .bind(cart.product_id)
                .fetch_optional(&mut *tx)
                .await?;

        let available = stock.ok_or(StoreError::NotFound {
            resource: Resource::Product,
            id: cart.product_id,
        })?;

        if cart.quantity > available {
            return Err(StoreError::InsufficientStock {
                requested: cart.quantity,
                available,
            });
        }

        let inserted = sqlx::query(
            "INSERT INTO tbl_carrinhos (produto_id, quantidade, cliente_id) VALUES (?, ?, ?)",
        )
        .bind(cart.product_id)
        .bind(cart.quantity)
        .bind(cart.customer_id)
        .execute(&mut *tx)
        .await?;

        let decremented = sqlx::query(
            "UPDATE tbl_produtos SET qtd_em_estoque = qtd_em_estoque - ? \
             WHERE id = ? AND qtd_em_estoque >= ?",
        )
        .bind(cart.quantity)
        .bind(cart.product_id)
        .bind(cart.quantity)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() != 1 {
            return Err(StoreError::InsufficientStock {
                requested: cart.quantity,
                available,
            });
        }

        tx.commit().await?;
        inserted_id(inserted)
    }

    async fn get_cart(&self, id: i64) -> StoreResult<Option<Cart>> {
        let mut conn = self.connection().await?;
        let sql = format!("SELECT {} FROM tbl_carrinhos WHERE id = ?", CART_COLUMNS);
        Ok(sqlx::query_as::<_, Cart>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?)
    }

    async fn list_carts(&self, query: &ListQuery) -> StoreResult<Vec<Cart>> {
        let mut conn = self.connection().await?;
        let sql = list_sql(CART_COLUMNS, Resource::Cart, "produto_id", query);
        let mut statement = sqlx::query_as::<_, Cart>(&sql);
        if let Some(pattern) = like_pattern(query) {
            statement = statement.bind(pattern);
        }
        Ok(statement.fetch_all(&mut *conn).await?)
    }

    async fn list_carts_by_customer(&self, customer_id: i64) -> StoreResult<Vec<Cart>> {
        let mut conn = self.connection().await?;
        let sql = format!(
            "SELECT {} FROM tbl_carrinhos WHERE cliente_id = ? ORDER BY id ASC",
            CART_COLUMNS
        );
        Ok(sqlx::query_as::<_, Cart>(&sql)
            .bind(customer_id)
            .fetch_all(&mut *conn)
            .await?)
    }

    async fn update_cart(&self, id: i64, cart: &CartPayload) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        let result = sqlx::query(
            "UPDATE tbl_carrinhos SET produto_id = ?, quantidade = ?, cliente_id = ? WHERE id = ?",
        )
        .bind(cart.product_id)
        .bind(cart.quantity)
        .bind(cart.customer_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        self.confirm_update(&mut conn, Resource::Cart, id, result).await
    }

    async fn delete_cart(&self, id: i64) -> StoreResult<bool> {
        self.delete_row(Resource::Cart, id).await
    }

    // ==================
    // Orders
    // ==================

    async fn create_order(&self, order: &OrderPayload, placed_at: NaiveDateTime) -> StoreResult<i64> {
        let mut conn = self.connection().await?;
        let result = sqlx::query(
            "INSERT INTO tbl_pedidos (cliente_id, carrinho_id, data_pedido, status) VALUES (?, ?, ?, ?)",
        )
        .bind(order.customer_id)
        .bind(order.cart_id)
        .bind(placed_at)
        .bind(&order.status)
        .execute(&mut *conn)
        .await?;
        inserted_id(result)
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        let mut conn = self.connection().await?;
        let sql = format!("SELECT {} FROM tbl_pedidos WHERE id = ?", ORDER_COLUMNS);
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?)
    }

    async fn list_orders(&self, query: &ListQuery) -> StoreResult<Vec<Order>> {
        let mut conn = self.connection().await?;
        let sql = list_sql(ORDER_COLUMNS, Resource::Order, "status", query);
        let mut statement = sqlx::query_as::<_, Order>(&sql);
        if let Some(pattern) = like_pattern(query) {
            statement = statement.bind(pattern);
        }
        Ok(statement.fetch_all(&mut *conn).await?)
    }

    async fn list_orders_by_customer(&self, customer_id: i64) -> StoreResult<Vec<Order>> {
        let mut conn = self.connection().await?;
        let sql = format!(
            "SELECT {} FROM tbl_pedidos WHERE cliente_id = ? ORDER BY id ASC",
            ORDER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .fetch_all(&mut *conn)
            .await?)
    }
}
