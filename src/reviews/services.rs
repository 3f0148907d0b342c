use tracing::info;
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::{is_unique_violation, ApiError, ApiResult};
use crate::meals;
use crate::meals::filter::RatingSummary;
use crate::reviews::dto::{CreateReviewRequest, MealReviews, ReviewView};
use crate::reviews::repo;
use crate::state::AppState;

pub async fn list_for_meal(st: &AppState, meal_id: Uuid) -> ApiResult<MealReviews> {
    meals::repo::find_by_id(&st.db, meal_id)
        .await
        .map_err(ApiError::internal("Error fetching reviews"))?
        .ok_or_else(|| ApiError::not_found("Meal not found"))?;

    let rows = repo::list_for_meal(&st.db, meal_id)
        .await
        .map_err(ApiError::internal("Error fetching reviews"))?;
    let ratings: Vec<i32> = rows.iter().map(|r| r.rating).collect();
    let summary = RatingSummary::from_ratings(&ratings);

    Ok(MealReviews {
        meal_id,
        rating: summary.rating,
        review_count: summary.review_count,
        reviews: rows.into_iter().map(ReviewView::from).collect(),
    })
}

pub async fn create(st: &AppState, auth: &AuthUser, body: CreateReviewRequest) -> ApiResult<ReviewView> {
    body.validate()?;

    meals::repo::find_by_id(&st.db, body.meal_id)
        .await
        .map_err(ApiError::internal("Error creating review"))?
        .ok_or_else(|| ApiError::not_found("Meal not found"))?;

    match repo::insert(&st.db, body.meal_id, auth.id, body.rating, body.comment()).await {
        Ok(row) => {
            info!(review_id = %row.id, meal_id = %row.meal_id, rating = row.rating, "review created");
            Ok(row.into())
        }
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::conflict("You have already reviewed this meal"))
        }
        Err(e) => Err(ApiError::internal("Error creating review")(e)),
    }
}
