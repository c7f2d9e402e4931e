//! Orders, checkout validation and server-side pricing.
//!
//! Checkout requests come from an unauthenticated client. The server
//! prices them from the stored product catalog and shipping options; a
//! subtotal or total claimed by the client is only compared against the
//! computed amounts and rejects the order when they disagree.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{CurrencyCode, Email, Money, OrderId, OrderStatus, ProductId};
use crate::validation::{FieldErrors, FieldSpec, Rule, Schema};

// =============================================================================
// Stored order
// =============================================================================

/// Postal address for shipped orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// The customer who placed an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// One priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl OrderItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// The shipping option chosen at checkout, frozen at its price then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSelection {
    pub id: String,
    pub label: String,
    pub cost: Money,
}

/// An order record in the `orders` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub shipping: ShippingSelection,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin changes to an existing order. Omitted fields stay unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: OrderId,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Order {
    /// Create a new pending order from a priced checkout.
    #[must_use]
    pub fn place(
        customer: Customer,
        priced: PricedCheckout,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(crate::types::id::generate_at(now)),
            customer,
            items: priced.items,
            shipping: priced.shipping.clone(),
            subtotal: priced.subtotal,
            shipping_cost: priced.shipping.cost,
            total: priced.total,
            currency: priced.currency,
            status: OrderStatus::Pending,
            tracking_number: None,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an admin update.
    ///
    /// `updatedAt` becomes `now`, but never earlier than one millisecond
    /// after `createdAt`, so an updated order always reads as modified.
    /// Any status is accepted.
    pub fn apply_update(&mut self, update: OrderUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(tracking_number) = update.tracking_number {
            self.tracking_number = Some(tracking_number);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        self.updated_at = now.max(self.created_at + Duration::milliseconds(1));
    }
}

// =============================================================================
// Catalog (authoritative prices)
// =============================================================================

/// A product as stored in the `products` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    pub price: Money,
    #[serde(default = "available_by_default")]
    pub available: bool,
    /// Units left; `None` means untracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const fn available_by_default() -> bool {
    true
}

/// A shipping option offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    pub id: String,
    pub label: String,
    pub cost: Money,
}

/// Store settings read from the `site-config` document.
///
/// Other site-config fields are ignored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default = "default_shipping_options")]
    pub shipping_options: Vec<ShippingOption>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            shipping_options: default_shipping_options(),
        }
    }
}

fn default_shipping_options() -> Vec<ShippingOption> {
    [
        ("standard", "Standard Shipping", 500),
        ("express", "Express Shipping", 1500),
        ("pickup", "Pick up at a show", 0),
    ]
    .into_iter()
    .map(|(id, label, cents)| ShippingOption {
        id: id.to_string(),
        label: label.to_string(),
        cost: Money::from_cents(cents),
    })
    .collect()
}

/// Products and shipping options used to price a checkout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub settings: StoreSettings,
}

/// A checkout priced entirely from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCheckout {
    pub items: Vec<OrderItem>,
    pub shipping: ShippingSelection,
    pub subtotal: Money,
    pub total: Money,
    pub currency: CurrencyCode,
}

impl Catalog {
    /// Build a catalog from the `products` and `site-config` documents.
    ///
    /// # Errors
    ///
    /// Returns a serde error if either document is malformed.
    pub fn from_documents(products: Value, site_config: Value) -> Result<Self, serde_json::Error> {
        Ok(Self {
            products: serde_json::from_value(products)?,
            settings: serde_json::from_value(site_config)?,
        })
    }

    fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    fn shipping(&self, method: Option<&str>) -> Option<ShippingSelection> {
        let options = &self.settings.shipping_options;
        let option = match method {
            Some(id) => options.iter().find(|o| o.id == id)?,
            None => match options.first() {
                Some(first) => first,
                None => {
                    return Some(ShippingSelection {
                        id: "none".to_string(),
                        label: "No shipping".to_string(),
                        cost: Money::ZERO,
                    });
                }
            },
        };
        Some(ShippingSelection {
            id: option.id.clone(),
            label: option.label.clone(),
            cost: option.cost,
        })
    }

    /// Price a checkout request.
    ///
    /// Without a shipping method the first configured option is used.
    ///
    /// # Errors
    ///
    /// Returns field errors for unknown or unavailable products, quantities
    /// above tracked stock (summed over every line for the same product), an unknown shipping method, or a claimed
    /// subtotal/total that does not match the computed amount.
    pub fn price(&self, request: &CheckoutRequest) -> Result<PricedCheckout, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut items = Vec::with_capacity(request.items.len());

        for (index, line) in request.items.iter().enumerate() {
            let Some(product) = self.product(&line.product_id) else {
                errors.push(format!("items[{index}].productId"), "unknown product");
                continue;
            };
            if !product.available {
                errors.push(format!("items[{index}].productId"), "is not available");
                continue;
            }
            let requested = request
                .items
                .iter()
                .take(index + 1)
                .filter(|other| other.product_id == line.product_id)
                .fold(0_u32, |sum, other| sum.saturating_add(other.quantity));
            if let Some(stock) = product.stock.filter(|stock| requested > *stock) {
                errors.push(
                    format!("items[{index}].quantity"),
                    format!("only {stock} left in stock"),
                );
                continue;
            }
            items.push(OrderItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity: line.quantity,
                variant: line.variant.clone(),
            });
        }

        let shipping = self.shipping(request.shipping_method.as_deref());
        if shipping.is_none() {
            errors.push("shippingMethod", "unknown shipping method");
        }

        let (Some(shipping), true) = (shipping, errors.is_empty()) else {
            return Err(errors);
        };

        let subtotal: Money = items.iter().map(OrderItem::line_total).sum();
        let total = subtotal + shipping.cost;

        if let Some(claimed) = request.subtotal.filter(|c| !c.approx_eq(subtotal)) {
            errors.push(
                "subtotal",
                format!("does not match the computed subtotal {subtotal} (got {claimed})"),
            );
        }
        if let Some(claimed) = request.total.filter(|c| !c.approx_eq(total)) {
            errors.push(
                "total",
                format!("does not match the computed total {total} (got {claimed})"),
            );
        }
        errors.into_result()?;

        Ok(PricedCheckout {
            items,
            shipping,
            subtotal,
            total,
            currency: self.settings.currency,
        })
    }
}

// =============================================================================
// Checkout request
// =============================================================================

/// Customer details as submitted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// One requested line at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// An order-creation request from the client.
///
/// Any `status`, `id` or timestamps in the body are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer: CustomerInput,
    pub items: Vec<CheckoutItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    /// Client-computed subtotal, checked against the server's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Money>,
    /// Client-computed total, checked against the server's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Field rules for checkout bodies.
pub const CHECKOUT_SCHEMA: Schema = Schema::new(&[
    FieldSpec { path: "customer", rules: &[Rule::Required, Rule::Object] },
    FieldSpec { path: "customer.name", rules: &[Rule::Required, Rule::NonBlank, Rule::MaxLength(200)] },
    FieldSpec { path: "customer.email", rules: &[Rule::Required, Rule::Email] },
    FieldSpec { path: "customer.phone", rules: &[Rule::String, Rule::MaxLength(40)] },
    FieldSpec { path: "customer.address", rules: &[Rule::Object] },
    FieldSpec { path: "customer.address.line1", rules: &[Rule::Required, Rule::NonBlank] },
    FieldSpec { path: "customer.address.city", rules: &[Rule::Required, Rule::NonBlank] },
    FieldSpec { path: "customer.address.postalCode", rules: &[Rule::Required, Rule::NonBlank] },
    FieldSpec { path: "customer.address.country", rules: &[Rule::Required, Rule::NonBlank] },
    FieldSpec { path: "items", rules: &[Rule::Required, Rule::NonEmptyArray] },
    FieldSpec { path: "items[].productId", rules: &[Rule::Required, Rule::NonBlank] },
    FieldSpec { path: "items[].quantity", rules: &[Rule::Required, Rule::PositiveInteger] },
    FieldSpec { path: "items[].variant", rules: &[Rule::String] },
    FieldSpec { path: "shippingMethod", rules: &[Rule::NonBlank] },
    FieldSpec { path: "subtotal", rules: &[Rule::NonNegativeAmount] },
    FieldSpec { path: "total", rules: &[Rule::NonNegativeAmount] },
    FieldSpec { path: "notes", rules: &[Rule::String, Rule::MaxLength(2000)] },
]);

/// Field rules for admin order updates.
pub const ORDER_UPDATE_SCHEMA: Schema = Schema::new(&[
    FieldSpec { path: "id", rules: &[Rule::Required, Rule::NonBlank] },
    FieldSpec {
        path: "status",
        rules: &[Rule::OneOf(&["pending", "processing", "shipped", "delivered", "cancelled"])],
    },
    FieldSpec { path: "trackingNumber", rules: &[Rule::String, Rule::MaxLength(100)] },
    FieldSpec { path: "notes", rules: &[Rule::String, Rule::MaxLength(2000)] },
]);

impl CheckoutRequest {
    /// Validate a raw checkout body and deserialize it.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn from_json(body: Value) -> Result<Self, FieldErrors> {
        CHECKOUT_SCHEMA.validate(&body)?;
        serde_json::from_value(body).map_err(|e| FieldErrors::single("body", e.to_string()))
    }
}

impl OrderUpdate {
    /// Validate a raw order update body and deserialize it.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn from_json(body: Value) -> Result<Self, FieldErrors> {
        ORDER_UPDATE_SCHEMA.validate(&body)?;
        serde_json::from_value(body).map_err(|e| FieldErrors::single("body", e.to_string()))
    }
}

/// Validate, price and create an order from a raw checkout body.
///
/// # Errors
///
/// Returns field errors from validation or pricing.
pub fn checkout(body: Value, catalog: &Catalog, now: DateTime<Utc>) -> Result<Order, FieldErrors> {
    let request = CheckoutRequest::from_json(body)?;
    let email = Email::parse(&request.customer.email)
        .map_err(|e| FieldErrors::single("customer.email", e.to_string()))?;
    let priced = catalog.price(&request)?;

    let CustomerInput {
        name,
        phone,
        address,
        ..
    } = request.customer;
    let customer = Customer {
        name: name.trim().to_string(),
        email,
        phone,
        address,
    };

    Ok(Order::place(customer, priced, request.notes, now))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_documents(
            json!([
                {"id": "shirt", "name": "Tour Shirt", "price": "25.00", "sizes": ["S", "M"]},
                {"id": "vinyl", "name": "Debut LP", "price": 30, "stock": 2},
                {"id": "poster", "name": "Old Poster", "price": "10.00", "available": false}
            ]),
            json!({"siteName": "The Band"}),
        )
        .unwrap()
    }

    fn body() -> Value {
        json!({
            "customer": {"name": " Sam ", "email": "sam@example.com"},
            "items": [
                {"productId": "shirt", "quantity": 2, "variant": "M"},
                {"productId": "vinyl", "quantity": 1}
            ],
            "shippingMethod": "express",
            "status": "delivered"
        })
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_checkout_prices_from_catalog() {
        let order = checkout(body(), &catalog(), now()).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, order.updated_at);
        assert_eq!(order.customer.name, "Sam");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.subtotal, Money::from_cents(8000));
        assert_eq!(order.shipping_cost, Money::from_cents(1500));
        assert_eq!(order.total, Money::from_cents(9500));
        assert_eq!(order.shipping.id, "express");
        assert!(order.id.as_str().starts_with(&now().timestamp_millis().to_string()));
    }

    #[test]
    fn test_checkout_defaults_to_first_shipping_option() {
        let mut body = body();
        body.as_object_mut().unwrap().remove("shippingMethod");
        let order = checkout(body, &catalog(), now()).unwrap();
        assert_eq!(order.shipping.id, "standard");
        assert_eq!(order.total, Money::from_cents(8500));
    }

    #[test]
    fn test_checkout_rejects_tampered_total() {
        let mut body = body();
        body["total"] = json!("1.00");
        body["subtotal"] = json!(80);
        let errors = checkout(body, &catalog(), now()).unwrap_err();
        assert!(errors.contains("total"));
        assert!(!errors.contains("subtotal"));
    }

    #[test]
    fn test_checkout_accepts_matching_claimed_total() {
        let mut body = body();
        body["total"] = json!("95.00");
        assert!(checkout(body, &catalog(), now()).is_ok());
    }

    #[test]
    fn test_checkout_catalog_errors() {
        let body = json!({
            "customer": {"name": "Sam", "email": "sam@example.com"},
            "items": [
                {"productId": "ghost", "quantity": 1},
                {"productId": "poster", "quantity": 1},
                {"productId": "vinyl", "quantity": 3}
            ],
            "shippingMethod": "drone"
        });
        let errors = checkout(body, &catalog(), now()).unwrap_err();
        assert!(errors.contains("items[0].productId"));
        assert!(errors.contains("items[1].productId"));
        assert!(errors.contains("items[2].quantity"));
        assert!(errors.contains("shippingMethod"));
    }

    #[test]
    fn test_checkout_stock_counts_every_line_of_a_product() {
        let body = json!({
            "customer": {"name": "Sam", "email": "sam@example.com"},
            "items": [
                {"productId": "vinyl", "quantity": 2},
                {"productId": "vinyl", "quantity": 2}
            ]
        });
        let errors = checkout(body, &catalog(), now()).unwrap_err();
        assert!(!errors.contains("items[0].quantity"));
        assert!(errors.contains("items[1].quantity"));

        let body = json!({
            "customer": {"name": "Sam", "email": "sam@example.com"},
            "items": [
                {"productId": "vinyl", "quantity": 1},
                {"productId": "vinyl", "quantity": 1}
            ]
        });
        assert!(checkout(body, &catalog(), now()).is_ok());
    }

    #[test]
    fn test_checkout_schema_errors() {
        let body = json!({
            "customer": {"name": "", "email": "not-an-email", "address": {"line1": "1 Main St"}},
            "items": [{"productId": "shirt", "quantity": 0}]
        });
        let errors = checkout(body, &catalog(), now()).unwrap_err();
        assert!(errors.contains("customer.name"));
        assert!(errors.contains("customer.email"));
        assert!(errors.contains("customer.address.city"));
        assert!(errors.contains("items[0].quantity"));
    }

    #[test]
    fn test_apply_update_changes_only_given_fields() {
        let mut order = checkout(body(), &catalog(), now()).unwrap();
        order.tracking_number = Some("1Z999".to_string());

        let update = OrderUpdate::from_json(json!({"id": order.id, "status": "shipped"})).unwrap();
        order.apply_update(update, now());

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_number.as_deref(), Some("1Z999"));
        assert!(order.updated_at > order.created_at);
    }

    #[test]
    fn test_apply_update_accepts_backwards_status() {
        let mut order = checkout(body(), &catalog(), now()).unwrap();
        order.status = OrderStatus::Delivered;
        order.apply_update(
            OrderUpdate {
                id: order.id.clone(),
                status: Some(OrderStatus::Pending),
                tracking_number: None,
                notes: None,
            },
            now() + Duration::hours(1),
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.updated_at, now() + Duration::hours(1));
    }

    #[test]
    fn test_order_update_rejects_unknown_status() {
        let errors = OrderUpdate::from_json(json!({"id": "1", "status": "lost"})).unwrap_err();
        assert!(errors.contains("status"));
    }

    #[test]
    fn test_order_json_round_trip() {
        let order = checkout(body(), &catalog(), now()).unwrap();
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], json!("pending"));
        assert_eq!(value["total"], json!("95.00"));
        assert!(value.get("trackingNumber").is_none());
        let back: Order = serde_json::from_value(value).unwrap();
        assert_eq!(back, order);
    }
}
