use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::providers::repo_types::{ProviderListingRow, ProviderProfile, TopMealRow};
use crate::stats::OrderSummary;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub cuisine_type: Option<String>,
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meals_count: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ProviderProfile> for ProviderProfileView {
    fn from(p: ProviderProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            restaurant_name: p.restaurant_name,
            description: p.description,
            address: p.address,
            phone: p.phone,
            logo: p.logo,
            cuisine_type: p.cuisine_type,
            is_open: p.is_open,
            meals_count: None,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<ProviderListingRow> for ProviderProfileView {
    fn from(row: ProviderListingRow) -> Self {
        Self {
            meals_count: Some(row.meals_count),
            ..row.profile.into()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub address: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub cuisine_type: Option<String>,
    #[serde(default = "default_open")]
    pub is_open: bool,
}
fn default_open() -> bool {
    true
}

impl CreateProfileRequest {
    pub fn into_profile(self, user_id: Uuid) -> Result<ProviderProfile, ApiError> {
        let restaurant_name = self.restaurant_name.trim().to_string();
        let address = self.address.trim().to_string();
        if restaurant_name.is_empty() {
            return Err(ApiError::bad_request("Restaurant name is required"));
        }
        if address.is_empty() {
            return Err(ApiError::bad_request("Address is required"));
        }
        let now = OffsetDateTime::now_utc();
        Ok(ProviderProfile {
            id: Uuid::nil(),
            user_id,
            restaurant_name,
            description: self.description,
            address,
            phone: self.phone,
            logo: self.logo,
            cuisine_type: self.cuisine_type,
            is_open: self.is_open,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub restaurant_name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub cuisine_type: Option<String>,
    pub is_open: Option<bool>,
}

impl UpdateProfileRequest {
    pub fn apply(self, p: &mut ProviderProfile) -> Result<(), ApiError> {
        if let Some(name) = self.restaurant_name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::bad_request("Restaurant name is required"));
            }
            p.restaurant_name = name;
        }
        if let Some(address) = self.address {
            let address = address.trim().to_string();
            if address.is_empty() {
                return Err(ApiError::bad_request("Address is required"));
            }
            p.address = address;
        }
        if let Some(v) = self.description {
            p.description = Some(v);
        }
        if let Some(v) = self.phone {
            p.phone = Some(v);
        }
        if let Some(v) = self.logo {
            p.logo = Some(v);
        }
        if let Some(v) = self.cuisine_type {
            p.cuisine_type = Some(v);
        }
        if let Some(v) = self.is_open {
            p.is_open = v;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMealView {
    pub meal_id: Uuid,
    pub name: String,
    pub total_sold: i64,
    pub revenue: f64,
}

impl From<TopMealRow> for TopMealView {
    fn from(r: TopMealRow) -> Self {
        Self {
            meal_id: r.meal_id,
            name: r.name,
            total_sold: r.total_sold,
            revenue: r.revenue,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    #[serde(flatten)]
    pub orders: OrderSummary,
    pub total_meals: i64,
    pub top_meals: Vec<TopMealView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, address: &str) -> CreateProfileRequest {
        CreateProfileRequest {
            restaurant_name: name.into(),
            address: address.into(),
            description: None,
            phone: None,
            logo: None,
            cuisine_type: Some("Thai".into()),
            is_open: true,
        }
    }

    #[test]
    fn profile_requires_name_and_address() {
        let user = Uuid::new_v4();
        assert!(create("", "1 Main St").into_profile(user).is_err());
        assert!(create("Siam", " ").into_profile(user).is_err());
        let p = create(" Siam ", "1 Main St").into_profile(user).unwrap();
        assert_eq!(p.restaurant_name, "Siam");
        assert_eq!(p.user_id, user);
    }

    #[test]
    fn update_toggles_open_and_rejects_blank_name() {
        let mut p = create("Siam", "1 Main St").into_profile(Uuid::new_v4()).unwrap();
        UpdateProfileRequest {
            is_open: Some(false),
            ..UpdateProfileRequest::default()
        }
        .apply(&mut p)
        .unwrap();
        assert!(!p.is_open);

        let blank = UpdateProfileRequest {
            restaurant_name: Some("  ".into()),
            ..UpdateProfileRequest::default()
        };
        assert!(blank.apply(&mut p).is_err());
        assert_eq!(p.restaurant_name, "Siam");
    }

    #[test]
    fn stats_flatten_order_summary() {
        let stats = ProviderStats {
            orders: OrderSummary::default(),
            total_meals: 4,
            top_meals: vec![],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalOrders"], 0);
        assert_eq!(json["revenue"], 0.0);
        assert_eq!(json["totalMeals"], 4);
    }
}
