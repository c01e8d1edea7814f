use crate::auth::{ensure_owner, AuthUser};
use crate::auth_client::AuthClient;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::push_client::PushClient;
use crate::services::{ApplicationService, RecommendationService};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
    /// Identity provider client used by the authentication gate.
    pub auth_client: AuthClient,
    /// Push messaging gateway client.
    pub push_client: PushClient,
}

/// Health check endpoint. Bypasses the authentication gate.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "cardmatch-api",
            "version": "0.1.0"
        })),
    )
}

/// GET /api/users/:user_id
///
/// Returns the caller's own profile, or `data: null` when none exists yet
/// (the mobile client uses this to route into profile setup).
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Option<UserProfile>>>, AppError> {
    ensure_owner(&auth, &user_id)?;

    let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
        .bind(&user_id)
        .fetch_optional(&state.db)
        .await
        .context("fetching user profile")?;

    Ok(Json(ApiResponse::ok(profile)))
}

/// POST /api/users
///
/// Creates the caller's profile. The profile key is always the authenticated
/// subject id; a body cannot create a profile for anyone else.
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "INSERT INTO user_profiles \
         (user_id, name, phone, dob, annual_income, credit_score, monthly_spending, \
          primary_spending_category, push_token) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(&auth.0)
    .bind(&req.name)
    .bind(&req.phone)
    .bind(req.dob)
    .bind(req.annual_income)
    .bind(req.credit_score)
    .bind(req.monthly_spending)
    .bind(req.primary_spending_category)
    .bind(&req.push_token)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest(format!("Profile already exists for user {}", auth.0))
        }
        _ => AppError::DatabaseError(e),
    })?;

    tracing::info!("Profile created for user {}", auth.0);
    Ok(Json(ApiResponse::ok(profile)))
}

/// PUT /api/users/:user_id
///
/// Partial in-place update; absent body fields keep their stored values.
/// The key itself is immutable.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    ensure_owner(&auth, &user_id)?;

    let profile = sqlx::query_as::<_, UserProfile>(
        "UPDATE user_profiles SET \
           name = COALESCE($2, name), \
           phone = COALESCE($3, phone), \
           dob = COALESCE($4, dob), \
           annual_income = COALESCE($5, annual_income), \
           credit_score = COALESCE($6, credit_score), \
           monthly_spending = COALESCE($7, monthly_spending), \
           primary_spending_category = COALESCE($8, primary_spending_category), \
           push_token = COALESCE($9, push_token), \
           updated_at = now() \
         WHERE user_id = $1 RETURNING *",
    )
    .bind(&user_id)
    .bind(&req.name)
    .bind(&req.phone)
    .bind(req.dob)
    .bind(req.annual_income)
    .bind(req.credit_score)
    .bind(req.monthly_spending)
    .bind(req.primary_spending_category)
    .bind(&req.push_token)
    .fetch_optional(&state.db)
    .await
    .context("updating user profile")?
    .ok_or_else(|| AppError::NotFound(format!("No profile exists for user {}", user_id)))?;

    Ok(Json(ApiResponse::ok(profile)))
}

/// GET /api/cards
///
/// The full static catalog, in catalog (seed) order.
pub async fn list_cards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CreditCard>>>, AppError> {
    let cards = sqlx::query_as::<_, CreditCard>(
        "SELECT * FROM credit_cards ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(&state.db)
    .await
    .context("fetching card catalog")?;

    Ok(Json(ApiResponse::ok(cards)))
}

/// GET /api/recommendations/:user_id
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Recommendation>>>, AppError> {
    ensure_owner(&auth, &user_id)?;

    let service = RecommendationService::new(state.db.clone());
    let batch = service.list(&user_id).await?;

    Ok(Json(ApiResponse::ok(batch)))
}

/// POST /api/recommendations/:user_id
///
/// Regenerates the caller's batch from the current profile and catalog.
pub async fn generate_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Recommendation>>>, AppError> {
    ensure_owner(&auth, &user_id)?;

    let service = RecommendationService::new(state.db.clone());
    let batch = service.generate(&user_id).await?;

    Ok(Json(ApiResponse::ok(batch)))
}

/// POST /api/applications
pub async fn create_application(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<ApiResponse<Application>>, AppError> {
    ensure_owner(&auth, &req.user_id)?;

    let service = ApplicationService::new(state.db.clone(), state.push_client.clone());
    let application = service.apply(&auth.0, req.credit_card_id).await?;

    Ok(Json(ApiResponse::ok(application)))
}

/// GET /api/applications/:user_id
pub async fn list_applications(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Application>>>, AppError> {
    ensure_owner(&auth, &user_id)?;

    let service = ApplicationService::new(state.db.clone(), state.push_client.clone());
    let applications = service.list(&user_id).await?;

    Ok(Json(ApiResponse::ok(applications)))
}

/// GET /api/notifications/:user_id
///
/// Newest first.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    ensure_owner(&auth, &user_id)?;

    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(&user_id)
    .fetch_all(&state.db)
    .await
    .context("fetching notifications")?;

    Ok(Json(ApiResponse::ok(notifications)))
}

/// PUT /api/notifications/:id
///
/// Marks a notification as read. Idempotent: re-marking an already-read
/// notification is a no-op success. The read flag never reverses.
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if !req.read {
        return Err(AppError::BadRequest(
            "read only transitions to true".to_string(),
        ));
    }

    let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(&auth.0)
        .execute(&state.db)
        .await
        .context("marking notification read")?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "No notification {} for user {}",
            id, auth.0
        )));
    }

    Ok(Json(ApiResponse::ok_empty()))
}
