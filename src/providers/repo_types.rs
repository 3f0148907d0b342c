use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of the `provider_profiles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProviderProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_name: String,
    pub description: Option<String>,
    pub address: String,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub cuisine_type: Option<String>,
    pub is_open: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Profile with the number of meals customers can order.
#[derive(Debug, Clone, FromRow)]
pub struct ProviderListingRow {
    #[sqlx(flatten)]
    pub profile: ProviderProfile,
    pub meals_count: i64,
}

/// Best sellers, by summed order-item quantity.
#[derive(Debug, Clone, FromRow)]
pub struct TopMealRow {
    pub meal_id: Uuid,
    pub name: String,
    pub total_sold: i64,
    pub revenue: f64,
}

pub(crate) const PROFILE_COLUMNS: &str = "p.id, p.user_id, p.restaurant_name, p.description, \
     p.address, p.phone, p.logo, p.cuisine_type, p.is_open, p.created_at, p.updated_at";
