use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::cart::CartLine;
use crate::ApiResponse;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub course_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    /// Current list price; the order captures its own copy at checkout
    pub price: Decimal,
    pub added_at: DateTime<Utc>,
}

impl From<CartLine> for CartItemResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.item.id,
            course_id: line.course.id,
            course_title: line.course.title,
            price: line.course.price,
            added_at: line.item.created_at,
        }
    }
}

/// List the caller's cart
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart items", body = crate::ApiResponse<Vec<CartItemResponse>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<CartItemResponse>>>, ServiceError> {
    let lines = state.services.cart.items_for_user(user.user_id).await?;
    let items = lines.into_iter().map(CartItemResponse::from).collect();
    Ok(Json(ApiResponse::success(items)))
}

/// Add a course to the caller's cart
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Added", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "No such course", body = crate::errors::ErrorResponse),
        (status = 409, description = "Course already in cart", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), ServiceError> {
    let item = state
        .services
        .cart
        .add_item(user.user_id, request.course_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(json!({
            "message": "course added to cart",
            "item_id": item.id,
        }))),
    ))
}

/// Remove one course from the caller's cart
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Removed", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Course not in cart", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    state
        .services
        .cart
        .remove_item(user.user_id, course_id)
        .await?;

    Ok(Json(ApiResponse::success(json!({
        "message": "course removed from cart",
    }))))
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_to_cart))
        .route("/items/:course_id", delete(remove_from_cart))
}
