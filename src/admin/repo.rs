use anyhow::Context;
use sqlx::{FromRow, PgPool};

/// Row counts behind the admin dashboard.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct PlatformCounts {
    pub users: i64,
    pub customers: i64,
    pub providers: i64,
    pub provider_profiles: i64,
    pub meals: i64,
    pub categories: i64,
}

pub async fn platform_counts(db: &PgPool) -> anyhow::Result<PlatformCounts> {
    let counts = sqlx::query_as::<_, PlatformCounts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users)                          AS users,
            (SELECT COUNT(*) FROM users WHERE role = 'CUSTOMER')  AS customers,
            (SELECT COUNT(*) FROM users WHERE role = 'PROVIDER')  AS providers,
            (SELECT COUNT(*) FROM provider_profiles)              AS provider_profiles,
            (SELECT COUNT(*) FROM meals)                          AS meals,
            (SELECT COUNT(*) FROM categories)                     AS categories
        "#,
    )
    .fetch_one(db)
    .await
    .context("platform counts")?;
    Ok(counts)
}
