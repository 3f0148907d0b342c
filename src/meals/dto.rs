use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::meals::filter::RatingSummary;
use crate::meals::repo_types::{Meal, MealListingRow};

/// Meal as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image: Option<String>,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub provider_id: Uuid,
    pub provider_name: Option<String>,
    pub is_vegetarian: bool,
    pub is_spicy: bool,
    pub is_popular: bool,
    pub available: bool,
    pub ingredients: Vec<String>,
    pub preparation_time: Option<i32>,
    pub rating: f64,
    pub review_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl MealView {
    pub fn from_meal(m: Meal, ratings: RatingSummary) -> Self {
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            description: m.description,
            price: m.price,
            original_price: m.original_price,
            image: m.image,
            category_id: m.category_id,
            category_name: None,
            provider_id: m.provider_id,
            provider_name: None,
            is_vegetarian: m.is_vegetarian,
            is_spicy: m.is_spicy,
            is_popular: m.is_popular,
            available: m.available,
            ingredients: m.ingredients,
            preparation_time: m.preparation_time,
            rating: ratings.rating,
            review_count: ratings.review_count,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    pub fn from_listing(row: MealListingRow, ratings: RatingSummary) -> Self {
        let mut view = Self::from_meal(row.meal, ratings);
        view.category_name = Some(row.category_name);
        view.provider_name = Some(row.provider_name);
        view
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPage {
    pub meals: Vec<MealView>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub name: String,
    pub price: f64,
    pub category_id: Uuid,
    pub description: Option<String>,
    pub original_price: Option<f64>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    pub is_spicy: bool,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub preparation_time: Option<i32>,
}

fn default_available() -> bool {
    true
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub original_price: Option<f64>,
    pub image: Option<String>,
    pub is_vegetarian: Option<bool>,
    pub is_spicy: Option<bool>,
    pub is_popular: Option<bool>,
    pub available: Option<bool>,
    pub ingredients: Option<Vec<String>>,
    pub preparation_time: Option<i32>,
}

/// Checks shared by create and update.
pub(crate) fn validate_meal_fields(
    name: &str,
    price: f64,
    original_price: Option<f64>,
    preparation_time: Option<i32>,
) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Meal name is required"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::bad_request("Price must be a non-negative number"));
    }
    if let Some(op) = original_price {
        if !op.is_finite() || op < 0.0 {
            return Err(ApiError::bad_request(
                "Original price must be a non-negative number",
            ));
        }
    }
    if matches!(preparation_time, Some(t) if t < 0) {
        return Err(ApiError::bad_request("Preparation time must not be negative"));
    }
    Ok(())
}

impl CreateMealRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_meal_fields(
            &self.name,
            self.price,
            self.original_price,
            self.preparation_time,
        )
    }
}

impl UpdateMealRequest {
    /// Applies the patch to `meal`; returns true when the name changed.
    pub fn apply(self, meal: &mut Meal) -> bool {
        let mut renamed = false;
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            renamed = name != meal.name;
            meal.name = name;
        }
        if let Some(v) = self.price {
            meal.price = v;
        }
        if let Some(v) = self.category_id {
            meal.category_id = v;
        }
        if let Some(v) = self.description {
            meal.description = Some(v);
        }
        if let Some(v) = self.original_price {
            meal.original_price = Some(v);
        }
        if let Some(v) = self.image {
            meal.image = Some(v);
        }
        if let Some(v) = self.is_vegetarian {
            meal.is_vegetarian = v;
        }
        if let Some(v) = self.is_spicy {
            meal.is_spicy = v;
        }
        if let Some(v) = self.is_popular {
            meal.is_popular = v;
        }
        if let Some(v) = self.available {
            meal.available = v;
        }
        if let Some(v) = self.ingredients {
            meal.ingredients = v;
        }
        if let Some(v) = self.preparation_time {
            meal.preparation_time = Some(v);
        }
        renamed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_meal() -> Meal {
        Meal {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "Paneer Tikka".into(),
            slug: "paneer-tikka-1a2b3c4d".into(),
            description: None,
            price: 12.5,
            original_price: None,
            image: None,
            is_vegetarian: true,
            is_spicy: true,
            is_popular: false,
            available: true,
            ingredients: vec!["paneer".into(), "yogurt".into()],
            preparation_time: Some(20),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut meal = sample_meal();
        let patch = UpdateMealRequest {
            price: Some(15.0),
            available: Some(false),
            ..UpdateMealRequest::default()
        };
        assert!(!patch.apply(&mut meal));
        assert_eq!(meal.price, 15.0);
        assert!(!meal.available);
        assert_eq!(meal.name, "Paneer Tikka");
        assert!(meal.is_vegetarian);
    }

    #[test]
    fn patch_reports_rename() {
        let mut meal = sample_meal();
        let patch = UpdateMealRequest {
            name: Some("  Malai Tikka ".into()),
            ..UpdateMealRequest::default()
        };
        assert!(patch.apply(&mut meal));
        assert_eq!(meal.name, "Malai Tikka");
    }

    #[test]
    fn meal_view_serializes_camel_case_and_iso_dates() {
        let view = MealView::from_meal(
            sample_meal(),
            RatingSummary {
                rating: 4.7,
                review_count: 3,
            },
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["rating"], 4.7);
        assert_eq!(json["reviewCount"], 3);
        assert_eq!(json["isVegetarian"], true);
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
        assert!(json["originalPrice"].is_null());
    }

    #[test]
    fn field_validation() {
        assert!(validate_meal_fields("Soup", 0.0, None, None).is_ok());
        assert!(validate_meal_fields(" ", 5.0, None, None).is_err());
        assert!(validate_meal_fields("Soup", -1.0, None, None).is_err());
        assert!(validate_meal_fields("Soup", f64::NAN, None, None).is_err());
        assert!(validate_meal_fields("Soup", 5.0, Some(-2.0), None).is_err());
        assert!(validate_meal_fields("Soup", 5.0, None, Some(-5)).is_err());
    }
}
