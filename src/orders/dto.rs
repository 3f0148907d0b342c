use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::orders::cart::Cart;
use crate::orders::repo_types::{Order, OrderItemRow, OrderStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub meal_id: Uuid,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    pub total_price: f64,
    #[serde(default)]
    pub delivery_address: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    /// Validates the payload and gathers its items into a cart.
    pub fn to_cart(&self) -> Result<Cart, ApiError> {
        if self.items.is_empty() {
            return Err(ApiError::bad_request("Order must contain at least one item"));
        }
        if self.delivery_address.trim().is_empty() {
            return Err(ApiError::bad_request("Delivery address is required"));
        }
        if !self.total_price.is_finite() || self.total_price < 0.0 {
            return Err(ApiError::bad_request("Total price must be a non-negative number"));
        }
        let mut cart = Cart::new();
        for item in &self.items {
            cart.add(item.meal_id, item.quantity, item.price)?;
        }
        Ok(cart)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

impl OrderListQuery {
    pub fn status(&self) -> Result<Option<OrderStatus>, ApiError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .to_uppercase()
                .parse::<OrderStatus>()
                .map(Some)
                .map_err(|e| ApiError::bad_request(e.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub meal_name: String,
    pub quantity: i32,
    pub price: f64,
}

impl From<OrderItemRow> for OrderItemView {
    fn from(r: OrderItemRow) -> Self {
        Self {
            id: r.id,
            meal_id: r.meal_id,
            meal_name: r.meal_name,
            quantity: r.quantity,
            price: r.price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub status: OrderStatus,
    pub total_price: f64,
    pub delivery_address: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub payment_method: String,
    pub items: Vec<OrderItemView>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl OrderView {
    pub fn new(o: Order, items: Vec<OrderItemRow>) -> Self {
        Self {
            id: o.id,
            customer_id: o.customer_id,
            provider_id: o.provider_id,
            status: o.status,
            total_price: o.total_price,
            delivery_address: o.delivery_address,
            phone: o.phone,
            notes: o.notes,
            payment_method: o.payment_method,
            items: items.into_iter().map(OrderItemView::from).collect(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(items: serde_json::Value) -> CreateOrderRequest {
        serde_json::from_value(serde_json::json!({
            "items": items,
            "totalPrice": 31.0,
            "deliveryAddress": "12 Market Street",
        }))
        .unwrap()
    }

    #[test]
    fn two_items_make_two_lines() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let req = request(serde_json::json!([
            {"mealId": a, "quantity": 2, "price": 10.0},
            {"mealId": b, "quantity": 1, "price": 11.0},
        ]));
        let cart = req.to_cart().unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal(), 31.0);
    }

    #[test]
    fn repeated_meal_lines_become_one_item() {
        let a = Uuid::new_v4();
        let req = request(serde_json::json!([
            {"mealId": a, "quantity": 1, "price": 10.0},
            {"mealId": a, "quantity": 2, "price": 10.5},
        ]));
        let cart = req.to_cart().unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.lines()[0].price, 10.5);
    }

    #[test]
    fn empty_items_rejected() {
        let req = request(serde_json::json!([]));
        assert!(matches!(req.to_cart(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn missing_address_rejected() {
        let mut req = request(serde_json::json!([
            {"mealId": Uuid::new_v4(), "quantity": 1, "price": 1.0},
        ]));
        req.delivery_address = "  ".into();
        assert!(req.to_cart().is_err());
    }

    #[test]
    fn status_query_parsing() {
        let q = OrderListQuery {
            status: Some("delivered".into()),
        };
        assert_eq!(q.status().unwrap(), Some(OrderStatus::Delivered));
        assert_eq!(OrderListQuery::default().status().unwrap(), None);
        let bad = OrderListQuery {
            status: Some("lost".into()),
        };
        assert!(bad.status().is_err());
    }
}
