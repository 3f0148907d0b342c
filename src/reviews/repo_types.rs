use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Review joined with the reviewer's display name.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: OffsetDateTime,
}
