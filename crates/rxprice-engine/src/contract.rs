//! # Contract Price Lookup
//!
//! Finds the negotiated net price for a customer and product. A lookup
//! that fails for any reason means "no contract": the calling sale is
//! never blocked by this component.

use std::sync::Arc;

use tracing::{debug, warn};

use rxprice_core::Money;

use crate::error::SourceResult;
use crate::sources::{ContractPriceSource, ProductCatalog};

/// Contract price lookup over a catalog and a contract source.
#[derive(Clone)]
pub struct ContractPriceLookup {
    catalog: Arc<dyn ProductCatalog>,
    contracts: Arc<dyn ContractPriceSource>,
}

impl ContractPriceLookup {
    pub fn new(catalog: Arc<dyn ProductCatalog>, contracts: Arc<dyn ContractPriceSource>) -> Self {
        Self { catalog, contracts }
    }

    /// Net price for a product code and customer.
    ///
    /// `None` when the product is unknown, no active contract exists, or
    /// either lookup fails.
    pub async fn get_contract_price(&self, product_code: &str, customer_id: i64) -> Option<Money> {
        let product = match self.catalog.find_product(product_code).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                debug!(product_code, "Unknown product, no contract price");
                return None;
            }
            Err(e) => {
                warn!(product_code, error = %e, "Product lookup failed, ignoring contract pricing");
                return None;
            }
        };

        match self.for_product(customer_id, product.id).await {
            Ok(price) => price,
            Err(e) => {
                warn!(product_code, customer_id, error = %e, "Contract lookup failed, ignoring contract pricing");
                None
            }
        }
    }

    /// Net price for an already resolved product. Errors are returned so
    /// the resolver can log and time them alongside the other sources.
    pub async fn for_product(&self, customer_id: i64, product_id: i64) -> SourceResult<Option<Money>> {
        let price = self.contracts.contract_price(customer_id, product_id).await?;
        debug!(customer_id, product_id, contract_price = ?price.map(|p| p.minor()), "Contract lookup");
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingSource, FakeCatalog, FakeContracts};

    fn lookup(contracts: Arc<dyn ContractPriceSource>) -> ContractPriceLookup {
        ContractPriceLookup::new(Arc::new(FakeCatalog::with_sp001()), contracts)
    }

    #[tokio::test]
    async fn test_contract_found() {
        let lookup = lookup(Arc::new(FakeContracts::single(1065, 1, 85_000)));
        assert_eq!(
            lookup.get_contract_price("SP001", 1065).await,
            Some(Money::from_minor(85_000))
        );
    }

    #[tokio::test]
    async fn test_no_contract_for_other_customer() {
        let lookup = lookup(Arc::new(FakeContracts::single(1065, 1, 85_000)));
        assert_eq!(lookup.get_contract_price("SP001", 1066).await, None);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let lookup = lookup(Arc::new(FakeContracts::single(1065, 1, 85_000)));
        assert_eq!(lookup.get_contract_price("SP404", 1065).await, None);
    }

    #[tokio::test]
    async fn test_fails_open() {
        let failing = ContractPriceLookup::new(Arc::new(FailingSource), Arc::new(FailingSource));
        assert_eq!(failing.get_contract_price("SP001", 1065).await, None);

        let lookup = lookup(Arc::new(FailingSource));
        assert_eq!(lookup.get_contract_price("SP001", 1065).await, None);
        assert!(lookup.for_product(1065, 1).await.is_err());
    }
}
