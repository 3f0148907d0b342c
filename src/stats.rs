//! Dashboard aggregates, recomputed from order rows on every call.

use serde::Serialize;

use crate::orders::repo_types::OrderStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub placed: i64,
    pub preparing: i64,
    pub ready: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

impl StatusCounts {
    pub fn record(&mut self, status: OrderStatus) {
        let slot = match status {
            OrderStatus::Placed => &mut self.placed,
            OrderStatus::Preparing => &mut self.preparing,
            OrderStatus::Ready => &mut self.ready,
            OrderStatus::Delivered => &mut self.delivered,
            OrderStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }

    pub fn total(&self) -> i64 {
        self.placed + self.preparing + self.ready + self.delivered + self.cancelled
    }
}

/// Order counts plus revenue over delivered orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_orders: i64,
    pub by_status: StatusCounts,
    pub revenue: f64,
}

impl OrderSummary {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (OrderStatus, f64)>,
    {
        let mut by_status = StatusCounts::default();
        let mut revenue = 0.0;
        for (status, total) in rows {
            by_status.record(status);
            if status == OrderStatus::Delivered {
                revenue += total;
            }
        }
        Self {
            total_orders: by_status.total(),
            by_status,
            revenue: round_money(revenue),
        }
    }
}

/// Rounds to cents.
pub fn round_money(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::repo_types::OrderStatus::*;

    #[test]
    fn empty_summary_is_zero() {
        let summary = OrderSummary::from_rows(Vec::new());
        assert_eq!(summary, OrderSummary::default());
    }

    #[test]
    fn revenue_counts_only_delivered() {
        let summary = OrderSummary::from_rows(vec![
            (Delivered, 20.10),
            (Delivered, 9.95),
            (Cancelled, 100.0),
            (Placed, 12.0),
            (Preparing, 3.0),
        ]);
        assert_eq!(summary.total_orders, 5);
        assert_eq!(summary.by_status.delivered, 2);
        assert_eq!(summary.by_status.cancelled, 1);
        assert_eq!(summary.by_status.ready, 0);
        assert_eq!(summary.revenue, 30.05);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(OrderSummary::from_rows(vec![(Ready, 1.0)])).unwrap();
        assert_eq!(json["totalOrders"], 1);
        assert_eq!(json["byStatus"]["ready"], 1);
    }
}
