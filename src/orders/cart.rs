use uuid::Uuid;

use crate::error::ApiError;

/// One cart line: a meal, how many, and the unit price the client saw.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub meal_id: Uuid,
    pub quantity: i32,
    pub price: f64,
}

/// Owned cart an order is built from. Lines keep insertion order and a meal
/// appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of a meal, merging with an existing line. The latest
    /// price wins.
    pub fn add(&mut self, meal_id: Uuid, quantity: i32, price: f64) -> Result<(), ApiError> {
        if quantity < 1 {
            return Err(ApiError::bad_request("Quantity must be at least 1"));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ApiError::bad_request("Item price must be a non-negative number"));
        }
        match self.lines.iter_mut().find(|l| l.meal_id == meal_id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.price = price;
            }
            None => self.lines.push(CartLine {
                meal_id,
                quantity,
                price,
            }),
        }
        Ok(())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn meal_ids(&self) -> Vec<Uuid> {
        self.lines.iter().map(|l| l.meal_id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn subtotal(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.price * l.quantity as f64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_same_meal() {
        let meal = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(meal, 1, 10.0).unwrap();
        cart.add(Uuid::new_v4(), 2, 4.5).unwrap();
        cart.add(meal, 2, 10.0).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.subtotal(), 39.0);
    }

    #[test]
    fn add_rejects_bad_lines() {
        let mut cart = Cart::new();
        assert!(cart.add(Uuid::new_v4(), 0, 1.0).is_err());
        assert!(cart.add(Uuid::new_v4(), 1, -1.0).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn lines_keep_insertion_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut cart = Cart::new();
        cart.add(b, 1, 3.0).unwrap();
        cart.add(a, 1, 2.0).unwrap();
        cart.add(b, 1, 3.5).unwrap();
        assert_eq!(cart.meal_ids(), vec![b, a]);
        assert_eq!(cart.lines()[0].price, 3.5);
        assert_eq!(cart.subtotal(), 9.0);
    }
}
