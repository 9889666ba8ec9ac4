//! Shopping cart store
//!
//! Pure synchronous store: a keyed item list plus the drawer flag.
//! Adding an item that is already in the cart bumps its quantity in
//! place; totals are derived, never stored.

use formflow::{
    add_or_increment, find_by_key, remove_by_key, set_count, Action, Counted, Keyed, Store,
};
use serde::{Deserialize, Serialize};

/// One cart line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl Keyed for CartItem {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }
}

impl Counted for CartItem {
    fn count(&self) -> u32 {
        self.quantity
    }

    fn set_count(&mut self, count: u32) {
        self.quantity = count;
    }
}

/// Cart state: ordered items plus the drawer flag.
#[derive(Clone, Debug, Default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub is_open: bool,
}

impl CartState {
    /// Total price: Σ price · quantity.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.price * item.quantity as f64)
            .sum()
    }

    /// Total item count: Σ quantity.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Look up a line by item id.
    pub fn find(&self, id: &str) -> Option<&CartItem> {
        find_by_key(&self.items, &id.to_string())
    }
}

/// Cart actions.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum CartAction {
    /// Add an item, or bump its quantity if already present.
    ItemAdd {
        id: String,
        name: String,
        price: f64,
    },
    /// Remove a line. Absent id is a no-op.
    ItemRemove(String),
    /// Set a line's quantity to exactly this value; 0 removes the line.
    QuantitySet { id: String, quantity: u32 },
    /// Empty the cart.
    Clear,
    DrawerToggle,
    DrawerOpen,
    DrawerClose,
}

/// Cart reducer.
pub fn reducer(state: &mut CartState, action: CartAction) -> bool {
    match action {
        CartAction::ItemAdd { id, name, price } => {
            add_or_increment(
                &mut state.items,
                CartItem {
                    id,
                    name,
                    price,
                    quantity: 1,
                },
            );
            true
        }
        CartAction::ItemRemove(id) => remove_by_key(&mut state.items, &id),
        CartAction::QuantitySet { id, quantity } => set_count(&mut state.items, &id, quantity),
        CartAction::Clear => {
            let changed = !state.items.is_empty();
            state.items.clear();
            changed
        }
        CartAction::DrawerToggle => {
            state.is_open = !state.is_open;
            true
        }
        CartAction::DrawerOpen => {
            let changed = !state.is_open;
            state.is_open = true;
            changed
        }
        CartAction::DrawerClose => {
            let changed = state.is_open;
            state.is_open = false;
            changed
        }
    }
}

/// A fresh cart store.
pub fn store() -> Store<CartState, CartAction> {
    Store::new(CartState::default(), reducer)
}
