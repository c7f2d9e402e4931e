//! Order placement and administration over the `orders` document.
//!
//! Orders are stored newest first as a JSON array. Placement and updates
//! go through [`ContentStore::update`], so concurrent checkouts never
//! overwrite each other.

use chrono::{DateTime, Utc};
use serde_json::Value;

use backline_core::content::ContentKey;
use backline_core::order::{Catalog, Order, OrderUpdate, checkout};
use backline_core::types::OrderStatus;

use crate::db::ContentStore;
use crate::error::{AppError, Result};

const ORDERS: &str = ContentKey::Orders.as_str();

fn not_found() -> AppError {
    AppError::NotFound("Order".to_string())
}

fn into_records(document: Value) -> Vec<Value> {
    match document {
        Value::Array(records) => records,
        _ => Vec::new(),
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Parse stored orders, skipping records that no longer deserialize.
fn parse_orders(document: Value) -> Vec<Order> {
    into_records(document)
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Order>(record) {
            Ok(order) => Some(order),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed order record");
                None
            }
        })
        .collect()
}

/// Load the authoritative catalog from `products` and `site-config`.
///
/// # Errors
///
/// Returns `AppError::Internal` if either document is malformed.
pub async fn load_catalog(store: &dyn ContentStore) -> Result<Catalog> {
    let products = store.read_or_default(ContentKey::Products.as_str()).await?;
    let settings = store.read_or_default(ContentKey::SiteConfig.as_str()).await?;
    Catalog::from_documents(products, settings)
        .map_err(|e| AppError::Internal(format!("catalog malformed: {e}")))
}

/// Validate and price a checkout body and store it as a pending order.
///
/// # Errors
///
/// Returns `AppError::Validation` for invalid or mispriced checkouts, or a
/// storage error.
pub async fn place_order(store: &dyn ContentStore, body: Value, now: DateTime<Utc>) -> Result<Order> {
    let catalog = load_catalog(store).await?;
    let order = checkout(body, &catalog, now)?;
    let record = serde_json::to_value(&order)
        .map_err(|e| AppError::Internal(format!("order serialization failed: {e}")))?;

    store
        .modify(ORDERS, move |document| {
            let mut records = into_records(document);
            records.insert(0, record);
            Ok(Value::Array(records))
        })
        .await?;

    tracing::info!(
        order_id = %order.id,
        total = %order.total,
        items = order.items.len(),
        "Order placed"
    );
    Ok(order)
}

/// Apply an admin update to an existing order.
///
/// Status changes that move backwards in the lifecycle are accepted but
/// logged.
///
/// # Errors
///
/// Returns `AppError::Validation` for a malformed body, `AppError::NotFound`
/// if no order has the id, or a storage error.
pub async fn update_order(store: &dyn ContentStore, body: Value, now: DateTime<Utc>) -> Result<Order> {
    let update = OrderUpdate::from_json(body)?;
    let id = update.id.clone();
    let lookup = id.clone();

    let document = store
        .modify(ORDERS, move |document| {
            let mut records = into_records(document);
            let slot = records
                .iter_mut()
                .find(|record| record_id(record) == Some(lookup.as_str()))
                .ok_or_else(not_found)?;

            let mut order: Order = serde_json::from_value(slot.take())
                .map_err(|e| AppError::Internal(format!("order {lookup} malformed: {e}")))?;
            if let Some(to) = update.status {
                warn_on_backward(&order, to);
            }
            order.apply_update(update, now);
            *slot = serde_json::to_value(&order)
                .map_err(|e| AppError::Internal(format!("order serialization failed: {e}")))?;

            Ok(Value::Array(records))
        })
        .await?;

    let order = parse_orders(document)
        .into_iter()
        .find(|order| order.id == id)
        .ok_or_else(not_found)?;
    tracing::info!(order_id = %order.id, status = %order.status, "Order updated");
    Ok(order)
}

fn warn_on_backward(order: &Order, to: OrderStatus) {
    if !order.status.is_forward_transition(to) {
        tracing::warn!(
            order_id = %order.id,
            from = %order.status,
            to = %to,
            "Order status moved backwards"
        );
    }
}

/// Find one order by id.
///
/// # Errors
///
/// Returns `AppError::NotFound` if absent, or a storage error.
pub async fn find_order(store: &dyn ContentStore, id: &str) -> Result<Order> {
    let document = store.read_or_default(ORDERS).await?;
    parse_orders(document)
        .into_iter()
        .find(|order| order.id.as_str() == id)
        .ok_or_else(not_found)
}

/// All orders, newest first, optionally restricted to one status.
///
/// # Errors
///
/// Returns a storage error.
pub async fn list_orders(store: &dyn ContentStore, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    let document = store.read_or_default(ORDERS).await?;
    let mut orders: Vec<Order> = parse_orders(document)
        .into_iter()
        .filter(|order| status.is_none_or(|s| order.status == s))
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
}

/// Customer order tracking: the order is only revealed to its customer's email.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the order is absent or the email does
/// not match, or a storage error.
pub async fn track_order(store: &dyn ContentStore, id: &str, email: &str) -> Result<Order> {
    let order = find_order(store, id).await?;
    if order.customer.email.eq_ignore_case(email.trim()) {
        Ok(order)
    } else {
        Err(not_found())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::db::MemoryContentStore;

    async fn store_with_catalog() -> MemoryContentStore {
        let store = MemoryContentStore::new();
        store
            .write(
                "products",
                &json!([
                    {"id": "tee", "name": "Tour Tee", "price": "25.00"},
                    {"id": "lp", "name": "Vinyl", "price": "30.00", "stock": 2}
                ]),
            )
            .await
            .unwrap();
        store
    }

    fn checkout_body(quantity: u32) -> Value {
        json!({
            "customer": {"name": "Sam", "email": "Sam@Example.com"},
            "items": [{"productId": "tee", "quantity": quantity}],
            "shippingMethod": "standard"
        })
    }

    #[tokio::test]
    async fn test_place_order_prepends() {
        let store = store_with_catalog().await;
        let now = Utc::now();
        let first = place_order(&store, checkout_body(1), now).await.unwrap();
        let second = place_order(&store, checkout_body(2), now + Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(first.status, OrderStatus::Pending);
        assert_eq!(first.created_at, first.updated_at);

        let stored = store.read("orders").await.unwrap().unwrap();
        assert_eq!(stored[0]["id"], json!(second.id.as_str()));
        assert_eq!(stored[1]["id"], json!(first.id.as_str()));
    }

    #[tokio::test]
    async fn test_update_order_keeps_other_fields() {
        let store = store_with_catalog().await;
        let now = Utc::now();
        let placed = place_order(&store, checkout_body(1), now).await.unwrap();

        let updated = update_order(
            &store,
            json!({"id": placed.id.as_str(), "status": "shipped"}),
            now,
        )
        .await
        .unwrap();

        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.tracking_number, None);
        assert_eq!(updated.total, placed.total);
        assert!(updated.updated_at > updated.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_order_is_not_found() {
        let store = store_with_catalog().await;
        let err = update_order(&store, json!({"id": "nope", "status": "shipped"}), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.read("orders").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_status() {
        let store = store_with_catalog().await;
        let now = Utc::now();
        let a = place_order(&store, checkout_body(1), now).await.unwrap();
        place_order(&store, checkout_body(1), now + Duration::seconds(1))
            .await
            .unwrap();
        update_order(&store, json!({"id": a.id.as_str(), "status": "processing"}), now)
            .await
            .unwrap();

        let all = list_orders(&store, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].created_at >= all[1].created_at);

        let processing = list_orders(&store, Some(OrderStatus::Processing)).await.unwrap();
        assert_eq!(processing.len(), 1);
        assert_eq!(processing[0].id, a.id);
    }

    #[tokio::test]
    async fn test_track_order_requires_matching_email() {
        let store = store_with_catalog().await;
        let order = place_order(&store, checkout_body(1), Utc::now()).await.unwrap();

        assert!(track_order(&store, order.id.as_str(), "sam@example.COM").await.is_ok());
        assert!(matches!(
            track_order(&store, order.id.as_str(), "other@example.com").await,
            Err(AppError::NotFound(_))
        ));
    }
}
