use crate::auth::AuthUser;
use crate::entities::enrollment;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::ApiResponse;
use axum::{
    extract::{Json, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

impl From<enrollment::Model> for EnrollmentResponse {
    fn from(model: enrollment::Model) -> Self {
        Self {
            course_id: model.course_id,
            enrolled_at: model.enrolled_at,
        }
    }
}

/// List the caller's enrollments
#[utoipa::path(
    get,
    path = "/api/v1/enrollments",
    responses(
        (status = 200, description = "Enrollments", body = crate::ApiResponse<Vec<EnrollmentResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
pub async fn list_enrollments(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<EnrollmentResponse>>>, ServiceError> {
    let enrollments = state
        .services
        .enrollments
        .list_for_student(user.user_id)
        .await?;

    Ok(Json(ApiResponse::success(
        enrollments.into_iter().map(EnrollmentResponse::from).collect(),
    )))
}

pub fn enrollment_routes() -> Router<AppState> {
    Router::new().route("/", get(list_enrollments))
}
