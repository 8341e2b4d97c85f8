use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::users::RegisterInput;
use crate::ApiResponse;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "correct-horse-battery")]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email)]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    #[schema(example = "482913")]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Register a new student account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, verification pending", body = crate::ApiResponse<RegisteredResponse>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredResponse>>), ServiceError> {
    let input = RegisterInput {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        password: request.password,
    };

    let user = state.services.users.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisteredResponse {
            user_id: user.id,
            message: "Account created; verify it with the emailed code".to_string(),
        })),
    ))
}

/// Verify an account with its one-time code
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account verified", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid or expired code", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown email", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    request.validate()?;

    state
        .services
        .users
        .verify_otp(&request.email, &request.otp)
        .await?;

    Ok(Json(ApiResponse::success(
        json!({"message": "account verified"}),
    )))
}

/// Log in and receive an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = crate::ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse),
        (status = 403, description = "Account not verified", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ServiceError> {
    request.validate()?;

    let (_, token) = state
        .services
        .users
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(ApiResponse::success(TokenResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt_expiration,
    })))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/login", post(login))
}
