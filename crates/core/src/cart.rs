//! Client-held shopping cart.
//!
//! The cart lives in the browser and is only sent to the server at
//! checkout. Prices here are display prices; the order is repriced from
//! the catalog when it is placed.

use serde::{Deserialize, Serialize};

use crate::order::{CheckoutItem, CheckoutRequest, CustomerInput};
use crate::types::{Money, ProductId};

/// One product (and variant) in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl CartLine {
    fn is_same(&self, product_id: &ProductId, variant: Option<&str>) -> bool {
        &self.product_id == product_id && self.variant.as_deref() == variant
    }
}

/// A shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a line, merging with an existing line for the same product and variant.
    ///
    /// Adding a quantity of zero does nothing.
    pub fn add(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        match self
            .items
            .iter_mut()
            .find(|l| l.is_same(&line.product_id, line.variant.as_deref()))
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
                existing.unit_price = line.unit_price;
            }
            None => self.items.push(line),
        }
    }

    /// Remove a product/variant line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId, variant: Option<&str>) -> bool {
        let before = self.items.len();
        self.items.retain(|l| !l.is_same(product_id, variant));
        self.items.len() != before
    }

    /// Set the quantity of a line; zero removes it.
    ///
    /// Returns whether the line exists.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        variant: Option<&str>,
        quantity: u32,
    ) -> bool {
        if quantity == 0 {
            return self.remove(product_id, variant);
        }
        self.items
            .iter_mut()
            .find(|l| l.is_same(product_id, variant))
            .map(|line| line.quantity = quantity)
            .is_some()
    }

    /// Sum of all line totals at the cart's display prices.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|l| l.unit_price * l.quantity).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, l| count.saturating_add(l.quantity))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Turn the cart into a checkout request claiming the cart subtotal.
    #[must_use]
    pub fn into_checkout(
        self,
        customer: CustomerInput,
        shipping_method: Option<String>,
    ) -> CheckoutRequest {
        let subtotal = self.subtotal();
        CheckoutRequest {
            customer,
            items: self
                .items
                .into_iter()
                .map(|l| CheckoutItem {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    variant: l.variant,
                })
                .collect(),
            shipping_method,
            subtotal: Some(subtotal),
            total: None,
            notes: None,
        }
    }
}
