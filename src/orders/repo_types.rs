use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{text_enum, UnknownVariant};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Placed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Forward-only lifecycle; cancellation only before the food is ready.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Placed, Preparing)
                | (Preparing, Ready)
                | (Ready, Delivered)
                | (Placed, Cancelled)
                | (Preparing, Cancelled)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

text_enum!(OrderStatus);

/// Row of the `orders` table.
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub status: OrderStatus,
    pub total_price: f64,
    pub delivery_address: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub payment_method: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Order item joined with the meal name.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub meal_id: Uuid,
    pub meal_name: String,
    pub quantity: i32,
    pub price: f64,
}

pub(crate) const ORDER_COLUMNS: &str = "o.id, o.customer_id, o.provider_id, o.status, \
     o.total_price, o.delivery_address, o.phone, o.notes, o.payment_method, o.created_at, \
     o.updated_at";

pub(crate) const PAYMENT_CASH_ON_DELIVERY: &str = "CASH_ON_DELIVERY";

#[cfg(test)]
mod tests {
    use super::*;
    use super::OrderStatus::*;

    #[test]
    fn lifecycle_moves_forward_only() {
        assert!(Placed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Delivered));
        assert!(!Placed.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Preparing));
        assert!(!Delivered.can_transition_to(Placed));
    }

    #[test]
    fn cancellation_only_before_ready() {
        assert!(Placed.can_transition_to(Cancelled));
        assert!(Preparing.can_transition_to(Cancelled));
        assert!(!Ready.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Placed));
    }

    #[test]
    fn status_text_roundtrip() {
        for st in OrderStatus::ALL {
            assert_eq!(st.as_str().parse::<OrderStatus>().unwrap(), st);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_string(&Delivered).unwrap(), "\"DELIVERED\"");
    }
}
