use std::collections::HashMap;

use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::orders::cart::CartLine;
use crate::orders::repo_types::{
    Order, OrderItemRow, OrderStatus, ORDER_COLUMNS, PAYMENT_CASH_ON_DELIVERY,
};

pub struct NewOrder<'a> {
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub total_price: f64,
    pub delivery_address: &'a str,
    pub phone: Option<&'a str>,
    pub notes: Option<&'a str>,
}

const ITEM_SELECT: &str = r#"
    SELECT oi.id, oi.order_id, oi.meal_id, m.name AS meal_name, oi.quantity, oi.price
      FROM order_items oi
      JOIN meals m ON m.id = oi.meal_id
"#;

async fn insert_item_tx(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    line: &CartLine,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, meal_id, quantity, price)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(order_id)
    .bind(line.meal_id)
    .bind(line.quantity)
    .bind(line.price)
    .execute(&mut **tx)
    .await
    .context("insert order item")?;
    Ok(())
}

/// Writes the order and all its lines in one transaction.
pub async fn create_with_items(
    db: &PgPool,
    new: NewOrder<'_>,
    lines: &[CartLine],
) -> anyhow::Result<(Order, Vec<OrderItemRow>)> {
    let mut tx = db.begin().await.context("begin tx")?;

    let order = sqlx::query_as::<_, Order>(&format!(
        r#"
        INSERT INTO orders AS o (customer_id, provider_id, status, total_price,
                                 delivery_address, phone, notes, payment_method)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(new.customer_id)
    .bind(new.provider_id)
    .bind(OrderStatus::Placed)
    .bind(new.total_price)
    .bind(new.delivery_address)
    .bind(new.phone)
    .bind(new.notes)
    .bind(PAYMENT_CASH_ON_DELIVERY)
    .fetch_one(&mut *tx)
    .await
    .context("insert order")?;

    for line in lines {
        insert_item_tx(&mut tx, order.id, line).await?;
    }

    let items = sqlx::query_as::<_, OrderItemRow>(&format!(
        "{ITEM_SELECT} WHERE oi.order_id = $1 ORDER BY m.name"
    ))
    .bind(order.id)
    .fetch_all(&mut *tx)
    .await
    .context("load order items")?;

    tx.commit().await.context("commit tx")?;
    Ok((order, items))
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find order")?;
    Ok(order)
}

/// Items of every order in `order_ids`, grouped by order.
pub async fn items_for(
    db: &PgPool,
    order_ids: &[Uuid],
) -> anyhow::Result<HashMap<Uuid, Vec<OrderItemRow>>> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
        "{ITEM_SELECT} WHERE oi.order_id = ANY($1) ORDER BY m.name"
    ))
    .bind(order_ids)
    .fetch_all(db)
    .await
    .context("load order items")?;

    let mut grouped: HashMap<Uuid, Vec<OrderItemRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row);
    }
    Ok(grouped)
}

/// Orders newest first, optionally narrowed by customer, provider and status.
pub async fn list(
    db: &PgPool,
    customer_id: Option<Uuid>,
    provider_id: Option<Uuid>,
    status: Option<OrderStatus>,
) -> anyhow::Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        r#"
        SELECT {ORDER_COLUMNS}
          FROM orders o
         WHERE ($1::uuid IS NULL OR o.customer_id = $1)
           AND ($2::uuid IS NULL OR o.provider_id = $2)
           AND ($3::text IS NULL OR o.status = $3)
         ORDER BY o.created_at DESC
        "#
    ))
    .bind(customer_id)
    .bind(provider_id)
    .bind(status)
    .fetch_all(db)
    .await
    .context("list orders")?;
    Ok(orders)
}

/// Moves an order from `from` to `to`. `None` when the order is no longer in
/// `from` (or does not exist).
pub async fn update_status(
    db: &PgPool,
    id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
) -> anyhow::Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r#"
        UPDATE orders AS o
           SET status = $3, updated_at = now()
         WHERE o.id = $1 AND o.status = $2
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(db)
    .await
    .context("update order status")?;
    Ok(order)
}

/// `(status, total_price)` of every order, optionally of one provider.
pub async fn status_and_totals(
    db: &PgPool,
    provider_id: Option<Uuid>,
) -> anyhow::Result<Vec<(OrderStatus, f64)>> {
    let rows = sqlx::query_as::<_, (OrderStatus, f64)>(
        r#"
        SELECT status, total_price
          FROM orders
         WHERE ($1::uuid IS NULL OR provider_id = $1)
        "#,
    )
    .bind(provider_id)
    .fetch_all(db)
    .await
    .context("load order totals")?;
    Ok(rows)
}
