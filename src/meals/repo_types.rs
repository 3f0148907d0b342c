use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of the `meals` table.
#[derive(Debug, Clone, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub image: Option<String>,
    pub is_vegetarian: bool,
    pub is_spicy: bool,
    pub is_popular: bool,
    pub available: bool,
    pub ingredients: Vec<String>,
    pub preparation_time: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Meal joined with the names of its category and provider.
#[derive(Debug, Clone, FromRow)]
pub struct MealListingRow {
    #[sqlx(flatten)]
    pub meal: Meal,
    pub category_name: String,
    pub provider_name: String,
}

pub(crate) const MEAL_COLUMNS: &str = "m.id, m.provider_id, m.category_id, m.name, m.slug, \
     m.description, m.price, m.original_price, m.image, m.is_vegetarian, m.is_spicy, \
     m.is_popular, m.available, m.ingredients, m.preparation_time, m.created_at, m.updated_at";
