use super::common::PaginationParams;
use crate::auth::AuthUser;
use crate::entities::course;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::courses::CreateCourseInput;
use crate::{ApiResponse, PaginatedResponse};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Practical Rust for Backend Engineers")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "49.99")]
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub teacher_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<course::Model> for CourseResponse {
    fn from(model: course::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            price: model.price,
            teacher_id: model.teacher_id,
            created_at: model.created_at,
        }
    }
}

/// Create a catalog entry (teachers and admins only)
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = crate::ApiResponse<CourseResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseResponse>>), ServiceError> {
    if !user.can_manage_courses() {
        return Err(ServiceError::Forbidden(
            "only teachers can create courses".to_string(),
        ));
    }

    request.validate()?;

    let course = state
        .services
        .courses
        .create_course(
            user.user_id,
            CreateCourseInput {
                title: request.title,
                description: request.description,
                price: request.price,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(course.into())),
    ))
}

/// List catalog entries
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(PaginationParams),
    responses(
        (status = 200, description = "Courses", body = crate::ApiResponse<crate::PaginatedResponse<CourseResponse>>)
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<CourseResponse>>>, ServiceError> {
    let (courses, total) = state
        .services
        .courses
        .list_courses(params.page, params.per_page)
        .await?;

    let per_page = params.per_page.max(1);
    let response = PaginatedResponse {
        items: courses.into_iter().map(CourseResponse::from).collect(),
        total,
        page: params.page,
        limit: per_page,
        total_pages: (total + per_page - 1) / per_page,
    };

    Ok(Json(ApiResponse::success(response)))
}

/// Fetch one catalog entry
#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course", body = crate::ApiResponse<CourseResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CourseResponse>>, ServiceError> {
    let course = state.services.courses.get_course(course_id).await?;
    Ok(Json(ApiResponse::success(course.into())))
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course))
        .route("/", get(list_courses))
        .route("/:course_id", get(get_course))
}
