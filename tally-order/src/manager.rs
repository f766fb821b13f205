use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use tally_core::catalog::{missing_product_ids, CatalogError, Product};
use tally_core::models::{distinct_product_ids, MAX_AMOUNT, MONEY_SCALE};
use tally_core::repository::{MarkPaid, PaymentRecord, StoreError};
use tally_core::{
    NewOrderItem, Order, OrderDetails, OrderError, OrderItemDetails, OrderReceipt, OrderResult,
    OrderStatus, PageMeta, Paginated, PaginationParams, StoredOrder,
};
use crate::context::ServiceContext;
use crate::remote::with_deadline;

/// Which workflow is asking the catalog; decides how an unknown id is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Create,
    Enrich,
}

/// Coordinates the order store and the product catalog for every order workflow.
pub struct OrderManager {
    ctx: Arc<ServiceContext>,
}

impl OrderManager {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Validate the requested lines against the catalog and persist a pending order.
    #[instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn create(&self, items: Vec<NewOrderItem>) -> OrderResult<OrderDetails> {
        validate_items(&items)?;

        let product_ids = distinct_product_ids(items.iter().map(|item| item.product_id.as_str()));
        let products = self.fetch_products(&product_ids, Lookup::Create).await?;
        warn_on_price_drift(&items, &products);

        let (order, rows) = Order::place(&items)?;
        self.ctx
            .orders
            .create_order(&order, &rows)
            .await
            .map_err(|e| persistence("create order", e))?;

        info!(order_id = %order.id, total_amount = %order.total_amount, "Order created");
        enrich(StoredOrder { order, items: rows, receipt: None }, &products)
    }

    /// One page of orders, optionally filtered by status. Items are not enriched.
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        status: Option<OrderStatus>,
        page: PaginationParams,
    ) -> OrderResult<Paginated<Order>> {
        page.validate()?;

        let total = self
            .ctx
            .orders
            .count_orders(status)
            .await
            .map_err(|e| persistence("count orders", e))?;
        let data = self
            .ctx
            .orders
            .list_orders(status, &page)
            .await
            .map_err(|e| persistence("list orders", e))?;

        Ok(Paginated { data, meta: PageMeta::new(total, &page) })
    }

    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> OrderResult<OrderDetails> {
        let (stored, products) = self.load(id).await?;
        enrich(stored, &products)
    }

    /// Set a new status. Setting the current status is a no-op.
    #[instrument(skip(self))]
    pub async fn change_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<OrderDetails> {
        let (stored, products) = self.load(id).await?;
        if stored.order.status == status {
            return enrich(stored, &products);
        }

        self.ctx.transitions.check(stored.order.status, status)?;

        let updated = self
            .ctx
            .orders
            .update_order_status(id, status)
            .await
            .map_err(|e| persistence("update order status", e))?
            .ok_or_else(|| not_found(id))?;

        info!(order_id = %id, from = %stored.order.status, to = %status, "Order status changed");
        enrich(StoredOrder { order: updated, ..stored }, &products)
    }

    /// Record a confirmed payment: PAID, paid flag, timestamp, reference and receipt in one write.
    ///
    /// An order that already has a receipt is left untouched.
    #[instrument(skip(self, receipt_url))]
    pub async fn mark_paid(
        &self,
        id: Uuid,
        payment_reference: &str,
        receipt_url: &str,
    ) -> OrderResult<OrderDetails> {
        let record = PaymentRecord {
            payment_reference: payment_reference.to_string(),
            paid_at: Utc::now(),
            receipt: OrderReceipt::new(id, receipt_url.to_string()),
        };

        let outcome = self
            .ctx
            .orders
            .mark_paid(id, &record)
            .await
            .map_err(|e| persistence("mark order paid", e))?;

        let details = match outcome {
            MarkPaid::NotFound => return Err(not_found(id)),
            MarkPaid::Applied => {
                info!(order_id = %id, "Order marked as PAID");
                self.find_one(id).await?
            }
            MarkPaid::AlreadyPaid => {
                let details = self.find_one(id).await?;
                if details.order.payment_reference.as_deref() == Some(payment_reference) {
                    info!(order_id = %id, "Duplicate payment confirmation ignored");
                } else {
                    warn!(
                        order_id = %id,
                        recorded = ?details.order.payment_reference,
                        received = payment_reference,
                        "Payment confirmation for an order paid under another reference ignored"
                    );
                }
                details
            }
        };

        Ok(details)
    }

    async fn load(&self, id: Uuid) -> OrderResult<(StoredOrder, Vec<Product>)> {
        let stored = self
            .ctx
            .orders
            .get_order(id)
            .await
            .map_err(|e| persistence("load order", e))?
            .ok_or_else(|| not_found(id))?;

        let products = self.fetch_products(&stored.product_ids(), Lookup::Enrich).await?;
        Ok((stored, products))
    }

    async fn fetch_products(&self, product_ids: &[String], lookup: Lookup) -> OrderResult<Vec<Product>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = with_deadline(
            "product catalog",
            self.ctx.catalog_timeout,
            self.ctx.catalog.validate_products(product_ids),
        )
        .await?;

        let products = response.map_err(|e| catalog_failure(e, lookup))?;

        // A catalog that answers without some ids is treated as not knowing them.
        let missing = missing_product_ids(product_ids, &products);
        if !missing.is_empty() {
            return Err(catalog_failure(CatalogError::UnknownProducts(missing), lookup));
        }
        Ok(products)
    }
}

fn catalog_failure(err: CatalogError, lookup: Lookup) -> OrderError {
    match (err, lookup) {
        (CatalogError::UnknownProducts(ids), Lookup::Create) => {
            warn!(unknown = ?ids, "Order rejected: unknown products");
            OrderError::InvalidInput(format!("Unknown products: {}", ids.join(", ")))
        }
        (CatalogError::UnknownProducts(ids), Lookup::Enrich) => {
            error!(unknown = ?ids, "Catalog no longer knows products of a stored order");
            OrderError::CollaboratorFailure(format!(
                "Product catalog no longer recognises products: {}",
                ids.join(", ")
            ))
        }
        (CatalogError::Unavailable(msg), _) => {
            error!("Product catalog call failed: {}", msg);
            OrderError::CollaboratorFailure(format!("Product catalog unavailable: {}", msg))
        }
    }
}

fn validate_items(items: &[NewOrderItem]) -> OrderResult<()> {
    if items.is_empty() {
        return Err(OrderError::InvalidInput("Order must contain at least one item".to_string()));
    }

    for (idx, item) in items.iter().enumerate() {
        if item.product_id.trim().is_empty() {
            return Err(OrderError::InvalidInput(format!("Item {} has an empty product id", idx)));
        }
        if item.quantity < 1 {
            return Err(OrderError::InvalidInput(format!(
                "Item {} quantity must be a positive integer, got {}",
                idx, item.quantity
            )));
        }
        if item.price.is_sign_negative() {
            return Err(OrderError::InvalidInput(format!(
                "Item {} price must not be negative, got {}",
                idx, item.price
            )));
        }
        if item.price.normalize().scale() > MONEY_SCALE {
            return Err(OrderError::InvalidInput(format!(
                "Item {} price must have at most {} decimal places, got {}",
                idx, MONEY_SCALE, item.price
            )));
        }
        if item.price > MAX_AMOUNT {
            return Err(OrderError::InvalidInput(format!(
                "Item {} price must not exceed {}, got {}",
                idx, MAX_AMOUNT, item.price
            )));
        }
    }
    Ok(())
}

// Caller prices are stored as given; a mismatch is only reported.
fn warn_on_price_drift(items: &[NewOrderItem], products: &[Product]) {
    for item in items {
        if let Some(product) = products.iter().find(|p| p.id == item.product_id) {
            if product.price != item.price {
                warn!(
                    product_id = %item.product_id,
                    requested = %item.price,
                    catalog = %product.price,
                    "Requested price differs from catalog price"
                );
            }
        }
    }
}

/// Attach product names to the stored lines.
fn enrich(stored: StoredOrder, products: &[Product]) -> OrderResult<OrderDetails> {
    let items = stored
        .items
        .into_iter()
        .map(|item| {
            let product = products
                .iter()
                .find(|p| p.id == item.product_id)
                .ok_or_else(|| {
                    OrderError::CollaboratorFailure(format!(
                        "Product catalog response is missing product {}",
                        item.product_id
                    ))
                })?;
            Ok(OrderItemDetails {
                product_id: item.product_id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                price: item.price,
            })
        })
        .collect::<OrderResult<Vec<_>>>()?;

    Ok(OrderDetails { order: stored.order, items, receipt: stored.receipt })
}

fn not_found(id: Uuid) -> OrderError {
    OrderError::NotFound(format!("Order with id {} not found", id))
}

fn persistence(action: &str, err: StoreError) -> OrderError {
    error!("Failed to {}: {}", action, err);
    OrderError::PersistenceFailure(format!("Failed to {}", action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::MockPaymentGateway;
    use crate::transitions::TransitionPolicy;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::time::Duration;
    use tally_core::catalog::ProductCatalog;
    use tally_core::repository::OrderRepository;
    use tally_store::{InMemoryCatalog, InMemoryOrderRepository};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::with_products([
            Product { id: "p-1".into(), name: "Mug".into(), price: dec!(10.50) },
            Product { id: "p-2".into(), name: "Pen".into(), price: dec!(5.25) },
        ])
    }

    fn manager_with(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> OrderManager {
        let ctx = ServiceContext::new(orders, catalog, Arc::new(MockPaymentGateway::default()));
        OrderManager::new(Arc::new(ctx))
    }

    fn setup() -> (OrderManager, InMemoryOrderRepository, InMemoryCatalog) {
        let repo = InMemoryOrderRepository::new();
        let catalog = catalog();
        let manager = manager_with(Arc::new(repo.clone()), Arc::new(catalog.clone()));
        (manager, repo, catalog)
    }

    fn sample_items() -> Vec<NewOrderItem> {
        vec![
            NewOrderItem::new("p-1", 2, dec!(10.50)),
            NewOrderItem::new("p-2", 1, dec!(5.25)),
        ]
    }

    struct UnavailableCatalog;

    #[async_trait]
    impl ProductCatalog for UnavailableCatalog {
        async fn validate_products(&self, _ids: &[String]) -> Result<Vec<Product>, CatalogError> {
            Err(CatalogError::Unavailable("connection refused".into()))
        }
    }

    /// Answers `Ok` with only the products it knows.
    struct PartialCatalog;

    #[async_trait]
    impl ProductCatalog for PartialCatalog {
        async fn validate_products(&self, _ids: &[String]) -> Result<Vec<Product>, CatalogError> {
            Ok(vec![Product { id: "p-1".into(), name: "Mug".into(), price: dec!(10.50) }])
        }
    }

    struct SlowCatalog;

    #[async_trait]
    impl ProductCatalog for SlowCatalog {
        async fn validate_products(&self, _ids: &[String]) -> Result<Vec<Product>, CatalogError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl OrderRepository for BrokenStore {
        async fn create_order(&self, _order: &Order, _items: &[tally_core::OrderItem]) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn count_orders(&self, _status: Option<OrderStatus>) -> Result<u64, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn list_orders(&self, _status: Option<OrderStatus>, _page: &PaginationParams) -> Result<Vec<Order>, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn get_order(&self, _id: Uuid) -> Result<Option<StoredOrder>, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn update_order_status(&self, _id: Uuid, _status: OrderStatus) -> Result<Option<Order>, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
        async fn mark_paid(&self, _id: Uuid, _payment: &PaymentRecord) -> Result<MarkPaid, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn test_create_snapshots_caller_totals() {
        let (manager, _, _) = setup();

        let details = manager.create(sample_items()).await.unwrap();

        assert_eq!(details.order.total_amount, dec!(26.25));
        assert_eq!(details.order.total_items, 2);
        assert_eq!(details.order.status, OrderStatus::Pending);
        assert!(!details.order.paid);
        let names: Vec<&str> = details.items.iter().map(|i| i.product_name.as_str()).collect();
        assert_eq!(names, vec!["Mug", "Pen"]);
    }

    #[tokio::test]
    async fn test_create_keeps_caller_price_over_catalog() {
        let (manager, _, _) = setup();

        let details = manager
            .create(vec![NewOrderItem::new("p-1", 3, dec!(1.00))])
            .await
            .unwrap();

        assert_eq!(details.order.total_amount, dec!(3.00));
        assert_eq!(details.items[0].price, dec!(1.00));
    }

    #[tokio::test]
    async fn test_create_unknown_product_persists_nothing() {
        let (manager, repo, _) = setup();

        let err = manager
            .create(vec![NewOrderItem::new("p-1", 1, dec!(10.50)), NewOrderItem::new("ghost", 1, dec!(1))])
            .await
            .unwrap_err();

        assert_eq!(err, OrderError::InvalidInput("Unknown products: ghost".into()));
        assert_eq!(repo.count_orders(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_with_incomplete_catalog_answer_persists_nothing() {
        let repo = InMemoryOrderRepository::new();
        let manager = manager_with(Arc::new(repo.clone()), Arc::new(PartialCatalog));

        let err = manager
            .create(vec![NewOrderItem::new("p-1", 1, dec!(10.50)), NewOrderItem::new("ghost", 1, dec!(1))])
            .await
            .unwrap_err();

        assert_eq!(err, OrderError::InvalidInput("Unknown products: ghost".into()));
        assert_eq!(repo.count_orders(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_prices_the_store_would_round() {
        let (manager, repo, catalog) = setup();

        let err = manager
            .create(vec![NewOrderItem::new("p-1", 2, dec!(10.555))])
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidInput(ref m) if m.contains("decimal places")));
        assert_eq!(catalog.calls(), 0);
        assert_eq!(repo.count_orders(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_accepts_trailing_zeros_at_two_places() {
        let (manager, _, _) = setup();

        let details = manager
            .create(vec![NewOrderItem::new("p-1", 2, dec!(10.500))])
            .await
            .unwrap();

        assert_eq!(details.items[0].price.to_string(), "10.50");
        assert_eq!(details.order.total_amount.to_string(), "21.00");
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_amounts() {
        let (manager, repo, _) = setup();

        let err = manager
            .create(vec![NewOrderItem::new("p-1", 1, dec!(10000000000.00))])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidInput(ref m) if m.contains("must not exceed")));

        let err = manager
            .create(vec![NewOrderItem::new("p-1", 2, Decimal::MAX)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidInput(_)));

        let err = manager
            .create(vec![NewOrderItem::new("p-1", i32::MAX, dec!(9999999999.99))])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidInput(ref m) if m.contains("Order total exceeds")));

        assert_eq!(repo.count_orders(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_empty_fails_before_remote_call() {
        let (manager, _, catalog) = setup();

        let err = manager.create(Vec::new()).await.unwrap_err();

        assert!(matches!(err, OrderError::InvalidInput(_)));
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_quantity() {
        let (manager, repo, catalog) = setup();

        let err = manager
            .create(vec![NewOrderItem::new("p-1", 0, dec!(10.50))])
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InvalidInput(_)));
        assert_eq!(catalog.calls(), 0);
        assert_eq!(repo.count_orders(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_catalog_outage_is_collaborator_failure() {
        let repo = InMemoryOrderRepository::new();
        let manager = manager_with(Arc::new(repo.clone()), Arc::new(UnavailableCatalog));

        let err = manager.create(sample_items()).await.unwrap_err();

        assert!(matches!(err, OrderError::CollaboratorFailure(_)));
        assert_eq!(repo.count_orders(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_catalog_timeout_is_collaborator_failure() {
        let repo = InMemoryOrderRepository::new();
        let ctx = ServiceContext::new(
            Arc::new(repo.clone()),
            Arc::new(SlowCatalog),
            Arc::new(MockPaymentGateway::default()),
        )
        .with_timeouts(Duration::from_millis(20), Duration::from_millis(20));
        let manager = OrderManager::new(Arc::new(ctx));

        let err = manager.create(sample_items()).await.unwrap_err();

        assert!(matches!(err, OrderError::CollaboratorFailure(ref m) if m.contains("did not respond")));
        assert_eq!(repo.count_orders(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_persistence_failure() {
        let manager = manager_with(Arc::new(BrokenStore), Arc::new(catalog()));

        let err = manager.create(sample_items()).await.unwrap_err();
        assert_eq!(err, OrderError::PersistenceFailure("Failed to create order".into()));

        let err = manager.find_one(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, OrderError::PersistenceFailure(_)));
    }

    #[tokio::test]
    async fn test_find_one_missing_is_not_found() {
        let (manager, _, catalog) = setup();

        let err = manager.find_one(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, OrderError::NotFound(_)));
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn test_find_one_enrichment_failure_is_distinct_from_not_found() {
        let (manager, _, catalog) = setup();
        let created = manager.create(sample_items()).await.unwrap();

        catalog.remove("p-2").await;
        let err = manager.find_one(created.order.id).await.unwrap_err();

        assert!(matches!(err, OrderError::CollaboratorFailure(_)));
    }

    #[tokio::test]
    async fn test_find_one_enriches_items() {
        let (manager, _, catalog) = setup();
        let created = manager.create(sample_items()).await.unwrap();

        let found = manager.find_one(created.order.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn test_change_status_same_status_is_noop() {
        let (manager, _, _) = setup();
        let created = manager.create(sample_items()).await.unwrap();

        let unchanged = manager
            .change_status(created.order.id, OrderStatus::Pending)
            .await
            .unwrap();

        assert_eq!(unchanged.order.updated_at, created.order.updated_at);
        assert_eq!(unchanged, created);
    }

    #[tokio::test]
    async fn test_change_status_any_to_any_by_default() {
        let (manager, _, _) = setup();
        let created = manager.create(sample_items()).await.unwrap();
        let id = created.order.id;

        let delivered = manager.change_status(id, OrderStatus::Delivered).await.unwrap();
        assert_eq!(delivered.order.status, OrderStatus::Delivered);
        assert_eq!(delivered.items.len(), 2);

        let back = manager.change_status(id, OrderStatus::Pending).await.unwrap();
        assert_eq!(back.order.status, OrderStatus::Pending);
        assert_eq!(back.order.total_amount, dec!(26.25));
    }

    #[tokio::test]
    async fn test_change_status_strict_policy() {
        let repo = InMemoryOrderRepository::new();
        let ctx = ServiceContext::new(
            Arc::new(repo),
            Arc::new(catalog()),
            Arc::new(MockPaymentGateway::default()),
        )
        .with_transitions(TransitionPolicy::Strict);
        let manager = OrderManager::new(Arc::new(ctx));
        let id = manager.create(sample_items()).await.unwrap().order.id;

        let err = manager.change_status(id, OrderStatus::Delivered).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidInput(_)));

        let cancelled = manager.change_status(id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_change_status_missing_order() {
        let (manager, _, _) = setup();
        let err = manager.change_status(Uuid::new_v4(), OrderStatus::Paid).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_paid_attaches_single_receipt() {
        let (manager, repo, _) = setup();
        let id = manager.create(sample_items()).await.unwrap().order.id;

        let paid = manager.mark_paid(id, "ch_123", "https://pay.example.com/r/1").await.unwrap();
        assert_eq!(paid.order.status, OrderStatus::Paid);
        assert!(paid.order.paid);
        assert!(paid.order.paid_at.is_some());
        assert_eq!(paid.order.payment_reference.as_deref(), Some("ch_123"));
        let receipt = paid.receipt.clone().unwrap();
        assert_eq!(receipt.receipt_url, "https://pay.example.com/r/1");

        let again = manager.mark_paid(id, "ch_123", "https://pay.example.com/r/2").await.unwrap();
        assert_eq!(again.receipt.unwrap().id, receipt.id);
        assert_eq!(again.order.paid_at, paid.order.paid_at);

        let stored = repo.get_order(id).await.unwrap().unwrap();
        assert_eq!(stored.receipt.unwrap().receipt_url, "https://pay.example.com/r/1");
    }

    #[tokio::test]
    async fn test_mark_paid_under_another_reference_keeps_first_payment() {
        let (manager, repo, _) = setup();
        let id = manager.create(sample_items()).await.unwrap().order.id;

        let first = manager.mark_paid(id, "ch_A", "https://pay.example.com/r/a").await.unwrap();
        let second = manager.mark_paid(id, "ch_B", "https://pay.example.com/r/b").await.unwrap();

        assert_eq!(second.order.payment_reference.as_deref(), Some("ch_A"));
        assert_eq!(second.order.paid_at, first.order.paid_at);
        assert_eq!(second.receipt, first.receipt);

        let stored = repo.get_order(id).await.unwrap().unwrap();
        assert_eq!(stored.order.payment_reference.as_deref(), Some("ch_A"));
        assert_eq!(stored.receipt.unwrap().receipt_url, "https://pay.example.com/r/a");
    }

    #[tokio::test]
    async fn test_mark_paid_missing_order() {
        let (manager, _, _) = setup();
        let err = manager.mark_paid(Uuid::new_v4(), "ch_1", "https://r").await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pages_cover_every_order_once() {
        let (manager, _, _) = setup();
        for _ in 0..7 {
            manager.create(sample_items()).await.unwrap();
        }

        let first = manager
            .find_all(None, PaginationParams::new(1, 3).unwrap())
            .await
            .unwrap();
        assert_eq!(first.meta.total, 7);
        assert_eq!(first.meta.last_page, 3);

        let mut seen = HashSet::new();
        let mut collected = 0;
        for page in 1..=first.meta.last_page as u32 {
            let result = manager
                .find_all(None, PaginationParams::new(page, 3).unwrap())
                .await
                .unwrap();
            assert_eq!(result.meta.page, page);
            collected += result.data.len();
            seen.extend(result.data.into_iter().map(|o| o.id));
        }
        assert_eq!(collected, 7);
        assert_eq!(seen.len(), 7);
    }

    #[tokio::test]
    async fn test_find_all_filters_by_status() {
        let (manager, _, _) = setup();
        let id = manager.create(sample_items()).await.unwrap().order.id;
        manager.create(sample_items()).await.unwrap();
        manager.mark_paid(id, "ch_1", "https://r/1").await.unwrap();

        let paid = manager
            .find_all(Some(OrderStatus::Paid), PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(paid.meta.total, 1);
        assert_eq!(paid.data[0].id, id);

        let err = manager
            .find_all(None, PaginationParams { page: 0, limit: 10 })
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidInput(_)));
    }
}
