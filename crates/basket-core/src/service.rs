//! # Services
//!
//! Basket, product and discount operations on top of the store traits.
//!
//! ## Mutation Flow
//! ```text
//! add_product(basket_id, product_id)
//!      │
//!      ├── products.by_id(product_id)   ── None ──► ProductNotFound
//!      ├── baskets.get(basket_id)       ── None ──► BasketNotFound
//!      ├── basket.add_product(product)
//!      └── baskets.save(&basket)
//! ```
//!
//! Every basket mutation is a read-modify-write against the store. Two
//! concurrent writers to the same basket are last-writer-wins.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::PriceBreakdown;
use crate::store::{BasketStore, DiscountCatalog, DiscountLookup, ProductCatalog, ProductLookup};
use crate::types::{Basket, Discount, DiscountInput, Product, ProductInput};
use crate::validation::{
    check_discount_attachable, find_conflicting_discounts, validate_discount_input,
    validate_product_input,
};

// =============================================================================
// Basket Service
// =============================================================================

/// Basket lifecycle, line items, discounts and totals.
#[derive(Clone)]
pub struct BasketService {
    baskets: Arc<dyn BasketStore>,
    products: Arc<dyn ProductLookup>,
    discounts: Arc<dyn DiscountLookup>,
}

impl BasketService {
    pub fn new(
        baskets: Arc<dyn BasketStore>,
        products: Arc<dyn ProductLookup>,
        discounts: Arc<dyn DiscountLookup>,
    ) -> Self {
        BasketService {
            baskets,
            products,
            discounts,
        }
    }

    pub async fn get_baskets(&self) -> CoreResult<Vec<Basket>> {
        self.baskets.list_all().await
    }

    pub async fn get_basket(&self, basket_id: &str) -> CoreResult<Basket> {
        self.baskets
            .get(basket_id)
            .await?
            .ok_or_else(|| CoreError::BasketNotFound(basket_id.to_string()))
    }

    /// Creates and stores an empty basket.
    pub async fn create_basket(&self) -> CoreResult<Basket> {
        self.baskets.create(Basket::new()).await
    }

    /// Deletes a basket. Deleting one that does not exist succeeds.
    pub async fn delete_basket(&self, basket_id: &str) -> CoreResult<()> {
        self.baskets.delete(basket_id).await?;
        Ok(())
    }

    /// Appends one line item for the product with this id.
    pub async fn add_product(&self, basket_id: &str, product_id: &str) -> CoreResult<()> {
        let product = self.product_by_id(product_id).await?;
        let mut basket = self.get_basket(basket_id).await?;
        basket.add_product(product);
        self.baskets.save(&basket).await
    }

    /// Appends one line item for the product carrying this code.
    pub async fn scan_product(&self, basket_id: &str, product_code: &str) -> CoreResult<()> {
        let product = self
            .products
            .by_code(product_code)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_code.to_string()))?;
        let mut basket = self.get_basket(basket_id).await?;
        basket.add_product(product);
        self.baskets.save(&basket).await
    }

    /// Removes the first line item for this product.
    ///
    /// The product must exist. A basket without such a line is left unchanged.
    pub async fn remove_product(&self, basket_id: &str, product_id: &str) -> CoreResult<()> {
        let product = self.product_by_id(product_id).await?;
        let mut basket = self.get_basket(basket_id).await?;
        if basket.remove_product(&product.id) {
            self.baskets.save(&basket).await?;
        }
        Ok(())
    }

    /// Attaches a discount.
    ///
    /// Attaching an already attached discount is a no-op. A different discount
    /// for the same product code is rejected with
    /// [`CoreError::ConflictingDiscount`].
    pub async fn add_discount(&self, basket_id: &str, discount_id: &str) -> CoreResult<()> {
        let discount = self.discount_by_id(discount_id).await?;
        let mut basket = self.get_basket(basket_id).await?;
        check_discount_attachable(&basket, &discount)?;
        if basket.add_discount(discount) {
            self.baskets.save(&basket).await?;
        }
        Ok(())
    }

    /// Detaches a discount. The discount must exist.
    pub async fn remove_discount(&self, basket_id: &str, discount_id: &str) -> CoreResult<()> {
        let discount = self.discount_by_id(discount_id).await?;
        let mut basket = self.get_basket(basket_id).await?;
        if basket.remove_discount(&discount.id) {
            self.baskets.save(&basket).await?;
        }
        Ok(())
    }

    /// Prices the basket. The result is rounded to two fraction digits.
    pub async fn calculate_total(&self, basket_id: &str) -> CoreResult<Money> {
        Ok(self.get_basket(basket_id).await?.total())
    }

    pub async fn price_breakdown(&self, basket_id: &str) -> CoreResult<PriceBreakdown> {
        Ok(self.get_basket(basket_id).await?.price_breakdown())
    }

    async fn product_by_id(&self, product_id: &str) -> CoreResult<Product> {
        self.products
            .by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))
    }

    async fn discount_by_id(&self, discount_id: &str) -> CoreResult<Discount> {
        self.discounts
            .by_id(discount_id)
            .await?
            .ok_or_else(|| CoreError::DiscountNotFound(discount_id.to_string()))
    }
}

// =============================================================================
// Product Service
// =============================================================================

/// Product catalog management.
#[derive(Clone)]
pub struct ProductService {
    catalog: Arc<dyn ProductCatalog>,
}

impl ProductService {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        ProductService { catalog }
    }

    pub async fn get_products(&self) -> CoreResult<Vec<Product>> {
        self.catalog.list().await
    }

    pub async fn get_product(&self, id: &str) -> CoreResult<Product> {
        self.catalog
            .by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    pub async fn get_product_by_code(&self, code: &str) -> CoreResult<Product> {
        self.catalog
            .by_code(code)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()))
    }

    pub async fn create_product(&self, input: ProductInput) -> CoreResult<Product> {
        validate_product_input(&input)?;
        self.catalog
            .create(Product::new(input.code, input.price))
            .await
    }

    /// Replaces code and price of an existing product.
    pub async fn update_product(&self, id: &str, input: ProductInput) -> CoreResult<Product> {
        let mut product = self.get_product(id).await?;
        validate_product_input(&input)?;
        product.code = input.code;
        product.price = input.price;
        product.updated_at = Utc::now();
        self.catalog.update(&product).await?;
        Ok(product)
    }

    /// Deletes a product. Deleting one that does not exist succeeds.
    pub async fn delete_product(&self, id: &str) -> CoreResult<()> {
        self.catalog.delete(id).await?;
        Ok(())
    }
}

// =============================================================================
// Discount Service
// =============================================================================

/// Discount catalog management.
///
/// Holds the basket store as well, so retargeting a discount can be checked
/// against the baskets it is attached to.
#[derive(Clone)]
pub struct DiscountService {
    catalog: Arc<dyn DiscountCatalog>,
    baskets: Arc<dyn BasketStore>,
}

impl DiscountService {
    pub fn new(catalog: Arc<dyn DiscountCatalog>, baskets: Arc<dyn BasketStore>) -> Self {
        DiscountService { catalog, baskets }
    }

    pub async fn get_discounts(&self) -> CoreResult<Vec<Discount>> {
        self.catalog.list().await
    }

    pub async fn get_discount(&self, id: &str) -> CoreResult<Discount> {
        self.catalog
            .by_id(id)
            .await?
            .ok_or_else(|| CoreError::DiscountNotFound(id.to_string()))
    }

    pub async fn create_discount(&self, input: DiscountInput) -> CoreResult<Discount> {
        validate_discount_input(&input)?;
        self.catalog
            .create(Discount::new(input.discount_type, input.product_code))
            .await
    }

    /// Replaces type and target code of an existing discount.
    ///
    /// A new target code that another discount already claims in some basket
    /// holding this one is rejected with [`CoreError::ConflictingDiscount`].
    pub async fn update_discount(&self, id: &str, input: DiscountInput) -> CoreResult<Discount> {
        let mut discount = self.get_discount(id).await?;
        validate_discount_input(&input)?;
        let retargeted = discount.product_code != input.product_code;
        discount.discount_type = input.discount_type;
        discount.product_code = input.product_code;
        discount.updated_at = Utc::now();
        if retargeted {
            self.check_retarget(&discount).await?;
        }
        self.catalog.update(&discount).await?;
        Ok(discount)
    }

    pub async fn delete_discount(&self, id: &str) -> CoreResult<()> {
        self.catalog.delete(id).await?;
        Ok(())
    }

    async fn check_retarget(&self, updated: &Discount) -> CoreResult<()> {
        for basket in self.baskets.list_all().await? {
            if !basket.has_discount(&updated.id) {
                continue;
            }
            let discounts: Vec<Discount> = basket
                .discounts
                .iter()
                .map(|d| if d.id == updated.id { updated.clone() } else { d.clone() })
                .collect();

            // Conflicts this basket already had are not this update's doing
            let conflict = find_conflicting_discounts(&discounts)
                .into_iter()
                .find(|(_, ids)| ids.contains(&updated.id));
            if let Some((product_code, ids)) = conflict {
                let existing = ids.into_iter().find(|d| *d != updated.id).unwrap_or_default();
                return Err(CoreError::ConflictingDiscount {
                    product_code,
                    existing,
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::store::InMemoryStore;
    use crate::types::DiscountType;

    struct Fixture {
        baskets: BasketService,
        products: ProductService,
        discounts: DiscountService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        Fixture {
            baskets: BasketService::new(store.clone(), store.clone(), store.clone()),
            products: ProductService::new(store.clone()),
            discounts: DiscountService::new(store.clone(), store),
        }
    }

    async fn seed_product(fx: &Fixture, code: &str, price: &str) -> Product {
        fx.products
            .create_product(ProductInput {
                code: code.to_string(),
                price: price.parse().unwrap(),
            })
            .await
            .unwrap()
    }

    async fn seed_discount(fx: &Fixture, kind: DiscountType, code: &str) -> Discount {
        fx.discounts
            .create_discount(DiscountInput {
                discount_type: kind,
                product_code: code.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_mixed_basket_total() {
        let fx = fixture();
        let a1 = seed_product(&fx, "A0001", "12.99").await;
        let a2 = seed_product(&fx, "A0002", "3.99").await;
        let a3 = seed_product(&fx, "A0003", "9.99").await;
        let ten = seed_discount(&fx, DiscountType::TenPercentOff, "A0001").await;
        let bogo = seed_discount(&fx, DiscountType::BuyOneGetOneFree, "A0002").await;

        let basket = fx.baskets.create_basket().await.unwrap();
        for product in [&a1, &a1, &a2, &a2, &a2, &a3] {
            fx.baskets.add_product(&basket.id, &product.id).await.unwrap();
        }
        fx.baskets.add_discount(&basket.id, &ten.id).await.unwrap();
        fx.baskets.add_discount(&basket.id, &bogo.id).await.unwrap();

        let total = fx.baskets.calculate_total(&basket.id).await.unwrap();
        assert_eq!(total.to_string(), "41.35");

        // Idempotent
        let again = fx.baskets.calculate_total(&basket.id).await.unwrap();
        assert_eq!(total, again);
    }

    #[tokio::test]
    async fn test_scan_adds_product_by_code() {
        let fx = fixture();
        seed_product(&fx, "A0002", "3.99").await;
        let bogo = seed_discount(&fx, DiscountType::BuyOneGetOneFree, "A0002").await;
        let basket = fx.baskets.create_basket().await.unwrap();

        for _ in 0..3 {
            fx.baskets.scan_product(&basket.id, "A0002").await.unwrap();
        }
        fx.baskets.add_discount(&basket.id, &bogo.id).await.unwrap();

        let total = fx.baskets.calculate_total(&basket.id).await.unwrap();
        assert_eq!(total.to_string(), "7.98");

        let err = fx.baskets.scan_product(&basket.id, "Z9999").await.unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(code) if code == "Z9999"));
    }

    #[tokio::test]
    async fn test_not_found_errors() {
        let fx = fixture();
        let product = seed_product(&fx, "A0001", "12.99").await;
        let discount = seed_discount(&fx, DiscountType::TenPercentOff, "A0001").await;
        let basket = fx.baskets.create_basket().await.unwrap();

        assert!(matches!(
            fx.baskets.get_basket("missing").await,
            Err(CoreError::BasketNotFound(_))
        ));
        assert!(matches!(
            fx.baskets.calculate_total("missing").await,
            Err(CoreError::BasketNotFound(_))
        ));
        assert!(matches!(
            fx.baskets.add_product("missing", &product.id).await,
            Err(CoreError::BasketNotFound(_))
        ));
        assert!(matches!(
            fx.baskets.add_product(&basket.id, "missing").await,
            Err(CoreError::ProductNotFound(_))
        ));
        assert!(matches!(
            fx.baskets.remove_product(&basket.id, "missing").await,
            Err(CoreError::ProductNotFound(_))
        ));
        assert!(matches!(
            fx.baskets.add_discount(&basket.id, "missing").await,
            Err(CoreError::DiscountNotFound(_))
        ));
        assert!(matches!(
            fx.baskets.remove_discount("missing", &discount.id).await,
            Err(CoreError::BasketNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_product_removes_one_line() {
        let fx = fixture();
        let a1 = seed_product(&fx, "A0001", "12.99").await;
        let a2 = seed_product(&fx, "A0002", "3.99").await;
        let basket = fx.baskets.create_basket().await.unwrap();
        fx.baskets.add_product(&basket.id, &a1.id).await.unwrap();
        fx.baskets.add_product(&basket.id, &a1.id).await.unwrap();

        fx.baskets.remove_product(&basket.id, &a1.id).await.unwrap();
        let loaded = fx.baskets.get_basket(&basket.id).await.unwrap();
        assert_eq!(loaded.item_count(), 1);

        // Not in the basket: no change, no error
        fx.baskets.remove_product(&basket.id, &a2.id).await.unwrap();
        let loaded = fx.baskets.get_basket(&basket.id).await.unwrap();
        assert_eq!(loaded.item_count(), 1);
    }

    #[tokio::test]
    async fn test_discount_attach_rules() {
        let fx = fixture();
        let ten = seed_discount(&fx, DiscountType::TenPercentOff, "A0001").await;
        let bogo = seed_discount(&fx, DiscountType::BuyOneGetOneFree, "A0001").await;
        let basket = fx.baskets.create_basket().await.unwrap();

        fx.baskets.add_discount(&basket.id, &ten.id).await.unwrap();
        fx.baskets.add_discount(&basket.id, &ten.id).await.unwrap();
        let loaded = fx.baskets.get_basket(&basket.id).await.unwrap();
        assert_eq!(loaded.discounts.len(), 1);

        let err = fx.baskets.add_discount(&basket.id, &bogo.id).await.unwrap_err();
        assert!(matches!(err, CoreError::ConflictingDiscount { existing, .. } if existing == ten.id));

        // Freed up once the first one is detached
        fx.baskets.remove_discount(&basket.id, &ten.id).await.unwrap();
        fx.baskets.add_discount(&basket.id, &bogo.id).await.unwrap();
        let loaded = fx.baskets.get_basket(&basket.id).await.unwrap();
        assert_eq!(loaded.discounts, vec![bogo]);
    }

    #[tokio::test]
    async fn test_basket_lifecycle() {
        let fx = fixture();
        let basket = fx.baskets.create_basket().await.unwrap();
        assert!(basket.is_empty());
        assert_eq!(
            fx.baskets.calculate_total(&basket.id).await.unwrap().to_string(),
            "0.00"
        );
        assert_eq!(fx.baskets.get_baskets().await.unwrap().len(), 1);

        fx.baskets.delete_basket(&basket.id).await.unwrap();
        // Second delete is not an error
        fx.baskets.delete_basket(&basket.id).await.unwrap();
        assert!(fx.baskets.get_baskets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_crud() {
        let fx = fixture();
        let product = seed_product(&fx, "A0001", "12.99").await;

        let updated = fx
            .products
            .update_product(
                &product.id,
                ProductInput {
                    code: "A0001-B".to_string(),
                    price: "11.50".parse().unwrap(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.code, "A0001-B");
        assert_eq!(
            fx.products.get_product_by_code("A0001-B").await.unwrap().id,
            product.id
        );

        let err = fx
            .products
            .create_product(ProductInput {
                code: "A0001-B".to_string(),
                price: Money::zero(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));

        let err = fx
            .products
            .create_product(ProductInput {
                code: "A0009".to_string(),
                price: Money::from_cents(-1),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBeNonNegative { .. })
        ));

        fx.products.delete_product(&product.id).await.unwrap();
        assert!(fx.products.get_product(&product.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_oversized_price_is_rejected() {
        let fx = fixture();
        let err = fx
            .products
            .create_product(ProductInput {
                code: "BIG".to_string(),
                price: "79228162514264337593543950335".parse().unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TooLarge { .. })
        ));
        assert!(fx.products.get_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discount_crud() {
        let fx = fixture();
        let discount = seed_discount(&fx, DiscountType::TenPercentOff, "A0001").await;

        let updated = fx
            .discounts
            .update_discount(
                &discount.id,
                DiscountInput {
                    discount_type: DiscountType::BuyOneGetOneFree,
                    product_code: "A0002".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.discount_type, DiscountType::BuyOneGetOneFree);
        assert_eq!(fx.discounts.get_discounts().await.unwrap(), vec![updated]);

        let err = fx
            .discounts
            .update_discount(
                "missing",
                DiscountInput {
                    discount_type: DiscountType::TenPercentOff,
                    product_code: "A0001".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DiscountNotFound(_)));

        fx.discounts.delete_discount(&discount.id).await.unwrap();
        assert!(fx.discounts.get_discounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retargeting_attached_discount_onto_claimed_code_is_rejected() {
        let fx = fixture();
        let a1 = seed_product(&fx, "A0001", "12.99").await;
        let ten = seed_discount(&fx, DiscountType::TenPercentOff, "A0001").await;
        let bogo = seed_discount(&fx, DiscountType::BuyOneGetOneFree, "A0002").await;
        let basket = fx.baskets.create_basket().await.unwrap();
        fx.baskets.add_product(&basket.id, &a1.id).await.unwrap();
        fx.baskets.add_product(&basket.id, &a1.id).await.unwrap();
        fx.baskets.add_discount(&basket.id, &ten.id).await.unwrap();
        fx.baskets.add_discount(&basket.id, &bogo.id).await.unwrap();

        let err = fx
            .discounts
            .update_discount(
                &bogo.id,
                DiscountInput {
                    discount_type: DiscountType::BuyOneGetOneFree,
                    product_code: "A0001".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ConflictingDiscount { ref product_code, ref existing }
                if product_code == "A0001" && *existing == ten.id
        ));

        // Unchanged in the catalog and in the basket
        assert_eq!(fx.discounts.get_discount(&bogo.id).await.unwrap().product_code, "A0002");
        let total = fx.baskets.calculate_total(&basket.id).await.unwrap();
        assert_eq!(total.to_string(), "23.38");

        // A code nobody claims is fine, and so is a type-only change
        fx.discounts
            .update_discount(
                &bogo.id,
                DiscountInput {
                    discount_type: DiscountType::BuyOneGetOneFree,
                    product_code: "A0003".to_string(),
                },
            )
            .await
            .unwrap();
        fx.discounts
            .update_discount(
                &ten.id,
                DiscountInput {
                    discount_type: DiscountType::BuyOneGetOneFree,
                    product_code: "A0001".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_retargeting_unattached_discount_is_allowed() {
        let fx = fixture();
        let ten = seed_discount(&fx, DiscountType::TenPercentOff, "A0001").await;
        let bogo = seed_discount(&fx, DiscountType::BuyOneGetOneFree, "A0002").await;
        let basket = fx.baskets.create_basket().await.unwrap();
        fx.baskets.add_discount(&basket.id, &ten.id).await.unwrap();

        let updated = fx
            .discounts
            .update_discount(
                &bogo.id,
                DiscountInput {
                    discount_type: DiscountType::BuyOneGetOneFree,
                    product_code: "A0001".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.product_code, "A0001");
    }

    #[tokio::test]
    async fn test_deleted_product_leaves_basket() {
        let fx = fixture();
        let product = seed_product(&fx, "A0001", "12.99").await;
        let basket = fx.baskets.create_basket().await.unwrap();
        fx.baskets.add_product(&basket.id, &product.id).await.unwrap();

        fx.products.delete_product(&product.id).await.unwrap();
        let total = fx.baskets.calculate_total(&basket.id).await.unwrap();
        assert_eq!(total.to_string(), "0.00");
    }
}
