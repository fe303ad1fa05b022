//! # Catalog Maintenance
//!
//! Product, customer and payment-method upkeep outside a sale. Every write
//! is validated first, then handed to the repositories.
//!
//! ## Product Lookup
//! ```text
//! query "8992388101019"           query "indomie"
//!      │                               │
//!      ▼                               ▼
//! looks like a barcode?  ──yes──► exact barcode lookup ──found──► [product]
//!      │ no                            │ not found
//!      ▼                               ▼
//! name / barcode substring search (LIKE)
//! ```

use tracing::{debug, info};

use warung_core::validation::{
    validate_customer_name, validate_package, validate_price, validate_product_name,
    validate_search_query,
};
use warung_core::{Customer, NewCustomer, PaymentMethod, Product, Receivable, Sale, ValidationError};
use warung_db::Database;

use crate::error::CatalogResult;

const SEARCH_LIMIT: u32 = 50;

/// Checks if a query looks like a barcode (8-13 numeric digits).
fn is_barcode_query(query: &str) -> bool {
    let len = query.len();
    (8..=13).contains(&len) && query.chars().all(|c| c.is_ascii_digit())
}

fn validate_product(product: &Product) -> Result<(), ValidationError> {
    validate_product_name(&product.name)?;
    validate_price(product.unit_price)?;
    validate_price(product.purchase_price)?;
    validate_package(product.package_price, product.package_qty)
}

/// Maintenance operations over the store's reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    db: Database,
}

impl Catalog {
    pub fn new(db: Database) -> Self {
        Catalog { db }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Searches the catalog; barcodes are tried as an exact match first.
    pub async fn search_products(&self, query: &str) -> CatalogResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        if is_barcode_query(&query) {
            if let Some(product) = self.db.products().get_by_barcode(&query).await? {
                debug!(barcode = %query, "Barcode hit");
                return Ok(vec![product]);
            }
        }

        Ok(self.db.products().search(&query, SEARCH_LIMIT).await?)
    }

    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.db.products().list(u32::MAX).await?)
    }

    pub async fn product(&self, id: &str) -> CatalogResult<Option<Product>> {
        Ok(self.db.products().get_by_id(id).await?)
    }

    /// Adds a product. Opening stock may not be negative.
    pub async fn add_product(&self, product: &Product) -> CatalogResult<Product> {
        validate_product(product)?;
        if product.stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let mut product = product.clone();
        product.name = product.name.trim().to_string();
        let saved = self.db.products().insert(&product).await?;
        info!(product_id = %saved.id, name = %saved.name, "Product added");
        Ok(saved)
    }

    /// Updates prices, name and barcode. Stock is left alone.
    pub async fn update_product(&self, product: &Product) -> CatalogResult<()> {
        validate_product(product)?;
        self.db.products().update(product).await?;
        Ok(())
    }

    /// Adds delivered units to the shelf and returns the new level.
    pub async fn restock(&self, product_id: &str, quantity: i64) -> CatalogResult<i64> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let stock = self.db.products().adjust_stock(product_id, quantity).await?;
        info!(product_id = %product_id, quantity, stock, "Product restocked");
        Ok(stock)
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn register_customer(&self, details: &NewCustomer) -> CatalogResult<Customer> {
        validate_customer_name(&details.name)?;
        let customer = self.db.customers().insert(details).await?;
        info!(customer_id = %customer.id, name = %customer.name, "Customer registered");
        Ok(customer)
    }

    pub async fn find_customer(&self, name: &str) -> CatalogResult<Option<Customer>> {
        Ok(self.db.customers().find_by_name(name).await?)
    }

    pub async fn list_customers(&self) -> CatalogResult<Vec<Customer>> {
        Ok(self.db.customers().list(u32::MAX).await?)
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    pub async fn payment_methods(&self) -> CatalogResult<Vec<PaymentMethod>> {
        Ok(self.db.payment_methods().list().await?)
    }

    pub async fn add_payment_method(&self, name: &str) -> CatalogResult<PaymentMethod> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::required("payment method name").into());
        }
        Ok(self.db.payment_methods().insert(name).await?)
    }

    // =========================================================================
    // Ledger Views
    // =========================================================================

    pub async fn recent_sales(&self, limit: u32) -> CatalogResult<Vec<Sale>> {
        Ok(self.db.sales().list_recent(limit).await?)
    }

    /// Pending receivables, earliest due first.
    pub async fn pending_receivables(&self) -> CatalogResult<Vec<Receivable>> {
        Ok(self.db.receivables().list_pending().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use warung_core::Money;
    use warung_db::{DbConfig, DbError};

    async fn catalog() -> Catalog {
        Catalog::new(Database::new(DbConfig::in_memory()).await.unwrap())
    }

    #[test]
    fn test_barcode_detection() {
        assert!(is_barcode_query("8992388101019"));
        assert!(is_barcode_query("12345678"));
        assert!(!is_barcode_query("1234567"));
        assert!(!is_barcode_query("indomie"));
    }

    #[tokio::test]
    async fn test_barcode_search_is_exact() {
        let catalog = catalog().await;
        let mut p = Product::new("Indomie Goreng", Money::from_units(3_500));
        p.barcode = Some("8992388101019".into());
        catalog.add_product(&p).await.unwrap();
        catalog
            .add_product(&Product::new("Indomie Soto", Money::from_units(3_300)))
            .await
            .unwrap();

        let hits = catalog.search_products("8992388101019").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Indomie Goreng");

        let hits = catalog.search_products("indomie").await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_add_product_validates_package() {
        let catalog = catalog().await;
        let mut p = Product::new("Aqua", Money::from_units(4_000));
        p.package_price = Some(Money::from_units(84_000));
        p.package_qty = 1;

        let err = catalog.add_product(&p).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(catalog.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restock() {
        let catalog = catalog().await;
        let p = catalog
            .add_product(&Product::new("Gula 1kg", Money::from_units(17_500)))
            .await
            .unwrap();

        assert_eq!(catalog.restock(&p.id, 12).await.unwrap(), 12);
        assert!(matches!(
            catalog.restock(&p.id, 0).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            catalog.restock("missing", 5).await,
            Err(CatalogError::Db(DbError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_register_customer_requires_name() {
        let catalog = catalog().await;
        let err = catalog
            .register_customer(&NewCustomer::named("   "))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "customer name is required");

        let c = catalog
            .register_customer(&NewCustomer::named("Siti"))
            .await
            .unwrap();
        let found = catalog.find_customer("siti").await.unwrap().unwrap();
        assert_eq!(found.id, c.id);
    }

    #[tokio::test]
    async fn test_duplicate_payment_method() {
        let catalog = catalog().await;
        catalog.add_payment_method("Tunai").await.unwrap();
        let err = catalog.add_payment_method("tunai").await.unwrap_err();
        assert!(matches!(err, CatalogError::Db(DbError::UniqueViolation { .. })));
        assert!(catalog.add_payment_method("  ").await.is_err());
    }
}
