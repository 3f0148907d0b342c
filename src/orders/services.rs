use std::collections::HashSet;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::meals;
use crate::meals::repo_types::Meal;
use crate::orders::cart::Cart;
use crate::orders::dto::{CreateOrderRequest, OrderView};
use crate::orders::repo::{self, NewOrder};
use crate::orders::repo_types::{Order, OrderStatus};
use crate::providers;
use crate::providers::repo_types::ProviderProfile;
use crate::state::AppState;

const PRICE_EPSILON: f64 = 0.005;

/// Checks every cart line against the loaded meals and returns the single
/// provider they belong to.
pub fn resolve_provider(cart: &Cart, meals: &[Meal]) -> Result<Uuid, ApiError> {
    if cart.is_empty() {
        return Err(ApiError::bad_request("Order must contain at least one item"));
    }
    let mut providers = HashSet::new();
    for line in cart.lines() {
        let meal = meals
            .iter()
            .find(|m| m.id == line.meal_id)
            .ok_or_else(|| ApiError::bad_request(format!("Meal {} does not exist", line.meal_id)))?;
        if !meal.available {
            return Err(ApiError::bad_request(format!(
                "Meal '{}' is currently unavailable",
                meal.name
            )));
        }
        providers.insert(meal.provider_id);
    }
    let mut ids = providers.into_iter();
    match (ids.next(), ids.next()) {
        (Some(id), None) => Ok(id),
        _ => Err(ApiError::bad_request(
            "All items in an order must come from the same restaurant",
        )),
    }
}

/// Whether `auth` may read `order`. `provider_id` is the caller's provider
/// profile, if any.
pub fn can_view(order: &Order, auth: &AuthUser, provider_id: Option<Uuid>) -> bool {
    auth.is_admin() || order.customer_id == auth.id || provider_id == Some(order.provider_id)
}

async fn with_items(st: &AppState, orders: Vec<Order>) -> ApiResult<Vec<OrderView>> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items = repo::items_for(&st.db, &ids)
        .await
        .map_err(ApiError::internal("Error fetching orders"))?;
    Ok(orders
        .into_iter()
        .map(|o| {
            let lines = items.remove(&o.id).unwrap_or_default();
            OrderView::new(o, lines)
        })
        .collect())
}

async fn single_view(st: &AppState, order: Order) -> ApiResult<OrderView> {
    let mut views = with_items(st, vec![order]).await?;
    views
        .pop()
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

async fn load(st: &AppState, id: Uuid) -> ApiResult<Order> {
    repo::find_by_id(&st.db, id)
        .await
        .map_err(ApiError::internal("Error fetching order"))?
        .ok_or_else(|| ApiError::not_found("Order not found"))
}

pub async fn create(st: &AppState, auth: &AuthUser, body: CreateOrderRequest) -> ApiResult<OrderView> {
    let cart = body.to_cart()?;

    let meals = meals::repo::find_many(&st.db, &cart.meal_ids())
        .await
        .map_err(ApiError::internal("Error creating order"))?;
    let provider_id = resolve_provider(&cart, &meals)?;

    let subtotal = cart.subtotal();
    if (subtotal - body.total_price).abs() > PRICE_EPSILON {
        warn!(subtotal, total_price = body.total_price, customer_id = %auth.id, "order total differs from item subtotal");
    }

    let new = NewOrder {
        customer_id: auth.id,
        provider_id,
        total_price: body.total_price,
        delivery_address: body.delivery_address.trim(),
        phone: body.phone.as_deref(),
        notes: body.notes.as_deref(),
    };
    let (order, items) = repo::create_with_items(&st.db, new, cart.lines())
        .await
        .map_err(ApiError::internal("Error creating order"))?;

    info!(order_id = %order.id, customer_id = %auth.id, %provider_id, lines = cart.len(), "order placed");
    Ok(OrderView::new(order, items))
}

pub async fn list_for_customer(st: &AppState, auth: &AuthUser) -> ApiResult<Vec<OrderView>> {
    let orders = repo::list(&st.db, Some(auth.id), None, None)
        .await
        .map_err(ApiError::internal("Error fetching orders"))?;
    with_items(st, orders).await
}

pub async fn get(st: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<OrderView> {
    let order = load(st, id).await?;

    let provider_id = if order.customer_id != auth.id && !auth.is_admin() {
        providers::repo::find_by_user(&st.db, auth.id)
            .await
            .map_err(ApiError::internal("Error fetching order"))?
            .map(|p| p.id)
    } else {
        None
    };
    if !can_view(&order, auth, provider_id) {
        return Err(ApiError::not_found("Order not found"));
    }
    single_view(st, order).await
}

pub async fn cancel(st: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<OrderView> {
    let order = load(st, id).await?;
    if order.customer_id != auth.id {
        return Err(ApiError::not_found("Order not found"));
    }
    if order.status != OrderStatus::Placed {
        return Err(ApiError::bad_request("Only placed orders can be cancelled"));
    }

    let updated = repo::update_status(&st.db, id, OrderStatus::Placed, OrderStatus::Cancelled)
        .await
        .map_err(ApiError::internal("Error cancelling order"))?
        .ok_or_else(|| ApiError::bad_request("Only placed orders can be cancelled"))?;
    info!(order_id = %id, customer_id = %auth.id, "order cancelled by customer");
    single_view(st, updated).await
}

pub async fn list_for_provider(
    st: &AppState,
    provider: &ProviderProfile,
    status: Option<OrderStatus>,
) -> ApiResult<Vec<OrderView>> {
    let orders = repo::list(&st.db, None, Some(provider.id), status)
        .await
        .map_err(ApiError::internal("Error fetching orders"))?;
    with_items(st, orders).await
}

pub async fn list_all(st: &AppState, status: Option<OrderStatus>) -> ApiResult<Vec<OrderView>> {
    let orders = repo::list(&st.db, None, None, status)
        .await
        .map_err(ApiError::internal("Error fetching orders"))?;
    with_items(st, orders).await
}

pub async fn update_status(
    st: &AppState,
    provider: &ProviderProfile,
    id: Uuid,
    next: OrderStatus,
) -> ApiResult<OrderView> {
    let order = load(st, id).await?;
    if order.provider_id != provider.id {
        return Err(ApiError::not_found("Order not found"));
    }
    if !order.status.can_transition_to(next) {
        return Err(ApiError::bad_request(format!(
            "Cannot change order status from {} to {}",
            order.status.as_str(),
            next.as_str()
        )));
    }

    let updated = repo::update_status(&st.db, id, order.status, next)
        .await
        .map_err(ApiError::internal("Error updating order status"))?
        .ok_or_else(|| ApiError::conflict("Order status was changed by another request"))?;
    info!(order_id = %id, from = order.status.as_str(), to = next.as_str(), "order status updated");
    single_view(st, updated).await
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::auth::repo_types::Role;
    use crate::meals::dto::tests::sample_meal;

    fn order(customer_id: Uuid, provider_id: Uuid) -> Order {
        let now = OffsetDateTime::now_utc();
        Order {
            id: Uuid::new_v4(),
            customer_id,
            provider_id,
            status: OrderStatus::Placed,
            total_price: 20.0,
            delivery_address: "1 Road".into(),
            phone: None,
            notes: None,
            payment_method: "CASH_ON_DELIVERY".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn resolves_the_shared_provider() {
        let a = sample_meal();
        let mut b = sample_meal();
        b.provider_id = a.provider_id;
        let mut cart = Cart::new();
        cart.add(a.id, 1, a.price).unwrap();
        cart.add(b.id, 2, b.price).unwrap();
        assert_eq!(resolve_provider(&cart, &[a.clone(), b]).unwrap(), a.provider_id);
    }

    #[test]
    fn mixed_providers_rejected() {
        let a = sample_meal();
        let b = sample_meal();
        let mut cart = Cart::new();
        cart.add(a.id, 1, a.price).unwrap();
        cart.add(b.id, 1, b.price).unwrap();
        assert!(matches!(
            resolve_provider(&cart, &[a, b]),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn empty_cart_has_no_provider() {
        assert!(matches!(
            resolve_provider(&Cart::new(), &[sample_meal()]),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn unknown_or_unavailable_meal_rejected() {
        let mut a = sample_meal();
        let mut cart = Cart::new();
        cart.add(a.id, 1, a.price).unwrap();
        assert!(resolve_provider(&cart, &[]).is_err());

        a.available = false;
        assert!(resolve_provider(&cart, &[a]).is_err());
    }

    #[test]
    fn visibility() {
        let customer = Uuid::new_v4();
        let provider = Uuid::new_v4();
        let o = order(customer, provider);

        let owner = AuthUser { id: customer, role: Role::Customer };
        let stranger = AuthUser { id: Uuid::new_v4(), role: Role::Customer };
        let admin = AuthUser { id: Uuid::new_v4(), role: Role::Admin };
        let seller = AuthUser { id: Uuid::new_v4(), role: Role::Provider };

        assert!(can_view(&o, &owner, None));
        assert!(!can_view(&o, &stranger, None));
        assert!(can_view(&o, &admin, None));
        assert!(can_view(&o, &seller, Some(provider)));
        assert!(!can_view(&o, &seller, Some(Uuid::new_v4())));
    }
}
