#![allow(dead_code)]

use chrono::NaiveDate;

use warung_core::{Cart, Customer, Money, NewCustomer, PaymentMethod, Product, SaleInput};
use warung_db::{Database, DbConfig};
use warung_engine::{EngineConfig, SaleEngine};

/// A fresh in-memory store with one cash and one debt payment method.
pub struct Fixture {
    pub db: Database,
    pub engine: SaleEngine,
    pub cash: PaymentMethod,
    pub debt: PaymentMethod,
}

/// Ledger state that a failed commit must leave untouched.
#[derive(Debug, PartialEq)]
pub struct Snapshot {
    pub stock: Vec<(String, i64)>,
    pub points: Vec<(String, String, i64)>,
    pub receivables: Vec<(String, i64, String)>,
    pub sales: Vec<(String, i64)>,
    pub items: Vec<(String, String, i64)>,
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn cart(lines: &[(&Product, i64)]) -> Cart {
    let mut cart = Cart::new();
    for (product, qty) in lines {
        cart.add(product, *qty).unwrap();
    }
    cart
}

impl Fixture {
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cash = db.payment_methods().insert("Tunai").await.unwrap();
        let debt = db.payment_methods().insert("Hutang").await.unwrap();
        let engine = SaleEngine::new(db.clone(), &EngineConfig::default());
        Fixture {
            db,
            engine,
            cash,
            debt,
        }
    }

    pub async fn product(&self, name: &str, unit_price: i64, stock: i64) -> Product {
        let mut p = Product::new(name, Money::from_units(unit_price));
        p.stock = stock;
        self.db.products().insert(&p).await.unwrap()
    }

    pub async fn packaged(
        &self,
        name: &str,
        unit_price: i64,
        package_qty: i64,
        package_price: i64,
        stock: i64,
    ) -> Product {
        let mut p = Product::new(name, Money::from_units(unit_price));
        p.package_qty = package_qty;
        p.package_price = Some(Money::from_units(package_price));
        p.stock = stock;
        self.db.products().insert(&p).await.unwrap()
    }

    pub async fn customer(&self, name: &str, points: i64) -> Customer {
        let c = self
            .db
            .customers()
            .insert(&NewCustomer::named(name))
            .await
            .unwrap();
        if points != 0 {
            self.db.customers().adjust_points(&c.id, points).await.unwrap();
        }
        self.db.customers().get_by_id(&c.id).await.unwrap().unwrap()
    }

    pub async fn stock_of(&self, product: &Product) -> i64 {
        self.db
            .products()
            .get_by_id(&product.id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }

    pub async fn points_of(&self, customer: &Customer) -> i64 {
        self.db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap()
            .points
    }

    /// Cash sale tendering `paid`.
    pub fn cash_sale(&self, cart: Cart, paid: i64) -> SaleInput {
        SaleInput {
            cart,
            payment_method_id: Some(self.cash.id.clone()),
            paid: Money::from_units(paid),
            transaction_date: Some(date()),
            ..SaleInput::default()
        }
    }

    /// Debt sale for an existing customer.
    pub fn debt_sale(&self, cart: Cart, customer: &Customer) -> SaleInput {
        SaleInput {
            cart,
            customer_id: Some(customer.id.clone()),
            payment_method_id: Some(self.debt.id.clone()),
            transaction_date: Some(date()),
            ..SaleInput::default()
        }
    }

    /// Installs a trigger that aborts the given statement on `table`.
    pub async fn inject_failure(&self, name: &str, event: &str, table: &str) {
        let sql = format!(
            "CREATE TRIGGER {name} BEFORE {event} ON {table} \
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END"
        );
        sqlx::query(&sql).execute(self.db.pool()).await.unwrap();
    }

    pub async fn snapshot(&self) -> Snapshot {
        let pool = self.db.pool();
        Snapshot {
            stock: sqlx::query_as("SELECT id, stock FROM products ORDER BY id")
                .fetch_all(pool)
                .await
                .unwrap(),
            points: sqlx::query_as("SELECT id, name, points FROM customers ORDER BY id")
                .fetch_all(pool)
                .await
                .unwrap(),
            receivables: sqlx::query_as(
                "SELECT sale_id, amount, status FROM receivables ORDER BY sale_id",
            )
            .fetch_all(pool)
            .await
            .unwrap(),
            sales: sqlx::query_as("SELECT id, total FROM sales ORDER BY id")
                .fetch_all(pool)
                .await
                .unwrap(),
            items: sqlx::query_as(
                "SELECT sale_id, product_id, quantity FROM sale_items ORDER BY sale_id, product_id, quantity",
            )
            .fetch_all(pool)
            .await
            .unwrap(),
        }
    }
}
