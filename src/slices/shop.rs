use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub sku: String,
    pub name: String,
    pub price_cents: u64,
    pub qty: u32,
}

/// Shop catalog and cart. Only the cart is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopState {
    pub catalog: Vec<Value>,
    pub cart: Vec<CartItem>,
    pub balance: Option<i64>,
}

impl ShopState {
    /// Add an item, merging quantity with an existing line of the same sku.
    pub fn add_to_cart(&mut self, item: CartItem) {
        match self.cart.iter_mut().find(|line| line.sku == item.sku) {
            Some(line) => line.qty += item.qty,
            None => self.cart.push(item),
        }
    }

    /// Drop one unit of `sku`; the line goes away at zero.
    pub fn remove_one(&mut self, sku: &str) -> bool {
        let Some(pos) = self.cart.iter().position(|line| line.sku == sku) else {
            return false;
        };
        if self.cart[pos].qty > 1 {
            self.cart[pos].qty -= 1;
        } else {
            self.cart.remove(pos);
        }
        true
    }

    pub fn total_cents(&self) -> u64 {
        self.cart
            .iter()
            .map(|line| line.price_cents * u64::from(line.qty))
            .sum()
    }
}
