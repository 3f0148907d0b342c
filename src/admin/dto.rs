use serde::{Deserialize, Serialize};

use crate::admin::repo::PlatformCounts;
use crate::auth::repo_types::{Role, UserStatus};
use crate::error::ApiError;
use crate::stats::OrderSummary;

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
}

impl UserListQuery {
    pub fn role(&self) -> Result<Option<Role>, ApiError> {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .to_uppercase()
                .parse::<Role>()
                .map(Some)
                .map_err(|e| ApiError::bad_request(e.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub status: UserStatus,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub total: i64,
    pub customers: i64,
    pub providers: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub users: UserCounts,
    pub total_providers: i64,
    pub total_meals: i64,
    pub total_categories: i64,
    #[serde(flatten)]
    pub orders: OrderSummary,
}

impl AdminStats {
    pub fn new(counts: PlatformCounts, orders: OrderSummary) -> Self {
        Self {
            users: UserCounts {
                total: counts.users,
                customers: counts.customers,
                providers: counts.providers,
            },
            total_providers: counts.provider_profiles,
            total_meals: counts.meals,
            total_categories: counts.categories,
            orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::repo_types::OrderStatus;

    #[test]
    fn role_query_is_case_insensitive() {
        let q = UserListQuery {
            role: Some("provider".into()),
        };
        assert_eq!(q.role().unwrap(), Some(Role::Provider));
        assert_eq!(UserListQuery::default().role().unwrap(), None);
        let bad = UserListQuery {
            role: Some("chef".into()),
        };
        assert!(matches!(bad.role(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn stats_shape() {
        let counts = PlatformCounts {
            users: 10,
            customers: 7,
            providers: 2,
            provider_profiles: 2,
            meals: 15,
            categories: 4,
        };
        let orders = OrderSummary::from_rows(vec![
            (OrderStatus::Delivered, 20.0),
            (OrderStatus::Placed, 5.0),
        ]);
        let json = serde_json::to_value(AdminStats::new(counts, orders)).unwrap();
        assert_eq!(json["users"]["total"], 10);
        assert_eq!(json["users"]["customers"], 7);
        assert_eq!(json["totalProviders"], 2);
        assert_eq!(json["totalCategories"], 4);
        assert_eq!(json["totalOrders"], 2);
        assert_eq!(json["revenue"], 20.0);
    }
}
