use tracing::{info, warn};
use uuid::Uuid;

use crate::admin::dto::AdminStats;
use crate::admin::repo;
use crate::auth::dto::PublicUser;
use crate::auth::extractors::AuthUser;
use crate::auth::repo_types::{Role, User, UserStatus};
use crate::error::{ApiError, ApiResult};
use crate::orders;
use crate::state::AppState;
use crate::stats::OrderSummary;

/// Admins may not lock themselves out.
pub fn ensure_not_self(auth: &AuthUser, target: Uuid, status: UserStatus) -> ApiResult<()> {
    if auth.id == target && status == UserStatus::Suspended {
        warn!(admin_id = %auth.id, "admin tried to suspend own account");
        return Err(ApiError::bad_request("You cannot suspend your own account"));
    }
    Ok(())
}

pub async fn list_users(st: &AppState, role: Option<Role>) -> ApiResult<Vec<PublicUser>> {
    let users = User::list(&st.db, role)
        .await
        .map_err(ApiError::internal("Error fetching users"))?;
    Ok(users.into_iter().map(PublicUser::from).collect())
}

pub async fn set_user_status(
    st: &AppState,
    auth: &AuthUser,
    id: Uuid,
    status: UserStatus,
) -> ApiResult<PublicUser> {
    ensure_not_self(auth, id, status)?;
    let user = User::set_status(&st.db, id, status)
        .await
        .map_err(ApiError::internal("Error updating user status"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    info!(user_id = %id, status = status.as_str(), admin_id = %auth.id, "user status changed");
    Ok(user.into())
}

pub async fn stats(st: &AppState) -> ApiResult<AdminStats> {
    let counts = repo::platform_counts(&st.db)
        .await
        .map_err(ApiError::internal("Error fetching stats"))?;
    let rows = orders::repo::status_and_totals(&st.db, None)
        .await
        .map_err(ApiError::internal("Error fetching stats"))?;
    Ok(AdminStats::new(counts, OrderSummary::from_rows(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_cannot_suspend_self() {
        let admin = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(matches!(
            ensure_not_self(&admin, admin.id, UserStatus::Suspended),
            Err(ApiError::BadRequest(_))
        ));
        assert!(ensure_not_self(&admin, admin.id, UserStatus::Active).is_ok());
        assert!(ensure_not_self(&admin, Uuid::new_v4(), UserStatus::Suspended).is_ok());
    }
}
