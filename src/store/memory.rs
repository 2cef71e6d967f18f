//! In-memory store
//!
//! All tables live behind one mutex, so the cart stock check and decrement
//! happen atomically. Ids are assigned from per-table counters starting at 1
//! and never reused, like AUTO_INCREMENT.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::model::{
    Cart, CartPayload, Customer, CustomerWrite, ListQuery, Order, OrderPayload, Product,
    ProductPayload, Resource,
};

use super::{Store, StoreError, StoreResult};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, build(id));
        id
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn replace(&mut self, id: i64, row: T) -> bool {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

#[derive(Debug)]
struct Tables {
    customers: Table<Customer>,
    products: Table<Product>,
    carts: Table<Cart>,
    orders: Table<Order>,
}

/// In-process backend
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                customers: Table::new(),
                products: Table::new(),
                carts: Table::new(),
                orders: Table::new(),
            }),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the backend going away (`false`) or coming back (`true`).
    /// While unavailable every operation fails with `StoreError::Connection`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of rows currently stored for `resource`
    pub fn row_count(&self, resource: Resource) -> usize {
        let Ok(tables) = self.tables.lock() else {
            return 0;
        };
        match resource {
            Resource::Customer => tables.customers.rows.len(),
            Resource::Product => tables.products.rows.len(),
            Resource::Cart => tables.carts.rows.len(),
            Resource::Order => tables.orders.rows.len(),
        }
    }

    fn acquire(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Connection(
                "memory store marked unavailable".to_string(),
            ));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::Execution("memory store lock poisoned".to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.acquire().map(|_| ())
    }

    async fn create_customer(&self, customer: &CustomerWrite) -> StoreResult<i64> {
        let mut tables = self.acquire()?;
        Ok(tables
            .customers
            .insert_with(|id| customer.clone().into_customer(id)))
    }

    async fn get_customer(&self, id: i64) -> StoreResult<Option<Customer>> {
        Ok(self.acquire()?.customers.get(id))
    }

    async fn list_customers(&self, query: &ListQuery) -> StoreResult<Vec<Customer>> {
        Ok(query.apply(self.acquire()?.customers.all()))
    }

    async fn update_customer(&self, id: i64, customer: &CustomerWrite) -> StoreResult<bool> {
        let mut tables = self.acquire()?;
        Ok(tables
            .customers
            .replace(id, customer.clone().into_customer(id)))
    }

    async fn delete_customer(&self, id: i64) -> StoreResult<bool> {
        Ok(self.acquire()?.customers.remove(id))
    }

    async fn create_product(&self, product: &ProductPayload) -> StoreResult<i64> {
        let mut tables = self.acquire()?;
        Ok(tables
            .products
            .insert_with(|id| product.clone().into_product(id)))
    }

    async fn get_product(&self, id: i64) -> StoreResult<Option<Product>> {
        Ok(self.acquire()?.products.get(id))
    }

    async fn list_products(&self, query: &ListQuery) -> StoreResult<Vec<Product>> {
        Ok(query.apply(self.acquire()?.products.all()))
    }

    async fn update_product(&self, id: i64, product: &ProductPayload) -> StoreResult<bool> {
        let mut tables = self.acquire()?;
        Ok(tables.products.replace(id, product.clone().into_product(id)))
    }

    async fn delete_product(&self, id: i64) -> StoreResult<bool> {
        Ok(self.acquire()?.products.remove(id))
    }

    async fn create_cart(&self, cart: &CartPayload) -> StoreResult<i64> {
        let mut tables = self.acquire()?;

        let product = tables
            .products
            .rows
            .get_mut(&cart.product_id)
            .ok_or(StoreError::NotFound {
                resource: Resource::Product,
                id: cart.product_id,
            })?;

        if cart.quantity > product.stock {
            return Err(StoreError::InsufficientStock {
                requested: cart.quantity,
                available: product.stock,
            });
        }
        product.stock -= cart.quantity;

        Ok(tables.carts.insert_with(|id| cart.into_cart(id)))
    }

    async fn get_cart(&self, id: i64) -> StoreResult<Option<Cart>> {
        Ok(self.acquire()?.carts.get(id))
    }

    async fn list_carts(&self, query: &ListQuery) -> StoreResult<Vec<Cart>> {
        Ok(query.apply(self.acquire()?.carts.all()))
    }

    async fn list_carts_by_customer(&self, customer_id: i64) -> StoreResult<Vec<Cart>> {
        let mut carts = self.acquire()?.carts.all();
        carts.retain(|cart| cart.customer_id == customer_id);
        Ok(carts)
    }

    async fn update_cart(&self, id: i64, cart: &CartPayload) -> StoreResult<bool> {
        let mut tables = self.acquire()?;
        Ok(tables.carts.replace(id, cart.into_cart(id)))
    }

    async fn delete_cart(&self, id: i64) -> StoreResult<bool> {
        Ok(self.acquire()?.carts.remove(id))
    }

    async fn create_order(&self, order: &OrderPayload, placed_at: NaiveDateTime) -> StoreResult<i64> {
        let mut tables = self.acquire()?;
        Ok(tables
            .orders
            .insert_with(|id| order.clone().into_order(id, placed_at)))
    }

    async fn get_order(&self, id: i64) -> StoreResult<Option<Order>> {
        Ok(self.acquire()?.orders.get(id))
    }

    async fn list_orders(&self, query: &ListQuery) -> StoreResult<Vec<Order>> {
        Ok(query.apply(self.acquire()?.orders.all()))
    }

    async fn list_orders_by_customer(&self, customer_id: i64) -> StoreResult<Vec<Order>> {
        let mut orders = self.acquire()?.orders.all();
        orders.retain(|order| order.customer_id == customer_id);
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(stock: i64) -> ProductPayload {
        ProductPayload {
            name: "Caneca".to_string(),
            description: "Caneca de cerâmica".to_string(),
            price: Decimal::new(2990, 2),
            stock,
            supplier_id: 1,
            supplier_cost: Decimal::new(1200, 2),
        }
    }

    fn cart(product_id: i64, quantity: i64) -> CartPayload {
        CartPayload {
            product_id,
            quantity,
            customer_id: 1,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_not_reused() {
        let store = MemoryStore::new();
        let a = store.create_product(&product(1)).await.unwrap();
        let b = store.create_product(&product(1)).await.unwrap();
        assert_eq!((a, b), (1, 2));

        assert!(store.delete_product(b).await.unwrap());
        let c = store.create_product(&product(1)).await.unwrap();
        assert_eq!(c, 3);
    }

    #[tokio::test]
    async fn test_cart_decrements_stock() {
        let store = MemoryStore::new();
        let product_id = store.create_product(&product(10)).await.unwrap();

        store.create_cart(&cart(product_id, 4)).await.unwrap();

        let stored = store.get_product(product_id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 6);
        assert_eq!(store.row_count(Resource::Cart), 1);
    }

    #[tokio::test]
    async fn test_cart_can_take_exact_stock() {
        let store = MemoryStore::new();
        let product_id = store.create_product(&product(3)).await.unwrap();

        store.create_cart(&cart(product_id, 3)).await.unwrap();

        let stored = store.get_product(product_id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 0);
    }

    #[tokio::test]
    async fn test_cart_over_stock_writes_nothing() {
        let store = MemoryStore::new();
        let product_id = store.create_product(&product(10)).await.unwrap();

        let err = store.create_cart(&cart(product_id, 11)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock {
                requested: 11,
                available: 10
            }
        ));

        let stored = store.get_product(product_id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 10);
        assert_eq!(store.row_count(Resource::Cart), 0);
    }

    #[tokio::test]
    async fn test_cart_for_missing_product() {
        let store = MemoryStore::new();
        let err = store.create_cart(&cart(99, 1)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                resource: Resource::Product,
                id: 99
            }
        ));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_with_connection_error() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(store.ping().await.unwrap_err().is_connection());
        assert!(store.get_product(1).await.unwrap_err().is_connection());

        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_row_reports_false() {
        let store = MemoryStore::new();
        assert!(!store.update_product(5, &product(1)).await.unwrap());
        assert!(!store.delete_cart(5).await.unwrap());
        assert_eq!(store.row_count(Resource::Product), 0);
    }
}
