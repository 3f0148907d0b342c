use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        repo::NewUser,
        repo_types::{Role, User, UserStatus},
        services::{hash_password, is_valid_email, verify_password, JwtKeys, MIN_PASSWORD_LEN},
    },
    error::{is_unique_violation, ApiError, ApiResult},
    extract::Json,
    response::{ApiResponse, Created},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let (access_token, refresh_token) = keys
        .sign_pair(&user)
        .map_err(ApiError::internal("Error issuing tokens"))?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<Created<AuthResponse>> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim();

    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::bad_request("Password too short"));
    }

    let role = payload.role.unwrap_or(Role::Customer);
    if role == Role::Admin {
        warn!(email = %payload.email, "attempt to self-register as admin");
        return Err(ApiError::forbidden("Cannot register as admin"));
    }

    // Ensure email is not taken
    match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::conflict("Email already registered"));
        }
        Ok(None) => {}
        Err(e) => return Err(ApiError::internal("Error registering user")(e)),
    }

    let hash = hash_password(&payload.password).map_err(ApiError::internal("Error registering user"))?;

    let user = match User::create(
        &state.db,
        NewUser {
            name,
            email: &payload.email,
            password_hash: &hash,
            role,
            phone: payload.phone.as_deref(),
        },
    )
    .await
    {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(ApiError::Internal("Error registering user"));
        }
    };

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    Ok(Created(ApiResponse::with_message(
        issue_tokens(&state, user)?,
        "User registered successfully",
    )))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
        Err(e) => return Err(ApiError::internal("Error logging in")(e)),
    };

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(ApiError::internal("Error logging in"))?;

    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    if user.status == UserStatus::Suspended {
        warn!(user_id = %user.id, "suspended account tried to log in");
        return Err(ApiError::forbidden("Account is suspended"));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(ApiResponse::with_message(
        issue_tokens(&state, user)?,
        "Login successful",
    )))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::Unauthorized("Invalid refresh token".into())
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(ApiError::internal("Error refreshing token"))?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    if user.status == UserStatus::Suspended {
        return Err(ApiError::forbidden("Account is suspended"));
    }

    Ok(Json(ApiResponse::ok(issue_tokens(&state, user)?)))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<PublicUser>>> {
    let user = User::find_by_id(&state.db, auth.id)
        .await
        .map_err(ApiError::internal("Error fetching user"))?
        .ok_or_else(|| {
            error!(user_id = %auth.id, "user not found");
            ApiError::Unauthorized("User not found".into())
        })?;

    Ok(Json(ApiResponse::ok(user.into())))
}
