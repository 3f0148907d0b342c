use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Category with the number of available meals in it.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    #[sqlx(flatten)]
    pub category: Category,
    pub meals_count: i64,
}

pub(crate) const CATEGORY_COLUMNS: &str =
    "c.id, c.name, c.slug, c.description, c.image, c.created_at";
