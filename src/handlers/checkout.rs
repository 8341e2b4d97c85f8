use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::checkout::BillingDetails;
use crate::ApiResponse;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Ada")]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[validate(email)]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 2, max = 100))]
    #[schema(example = "Portugal")]
    pub country: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    #[schema(example = "ORD-20250609143000-0042")]
    pub order_number: String,
    #[schema(example = "35.50")]
    pub total: Decimal,
    #[schema(example = "pending")]
    pub status: String,
}

/// Convert the caller's cart into a pending order
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = crate::ApiResponse<CheckoutResponse>),
        (status = 400, description = "Empty cart or invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn create_order_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutResponse>>), ServiceError> {
    request.validate()?;

    let lines = state.services.cart.items_for_user(user.user_id).await?;
    if lines.is_empty() {
        return Err(ServiceError::BadRequest(
            "cart is empty, add items to the cart before creating an order".to_string(),
        ));
    }

    let items: Vec<_> = lines.into_iter().map(|line| line.item).collect();

    let billing = BillingDetails {
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        country: request.country,
    };

    let (order, total) = state
        .services
        .checkout
        .create_order(user.user_id, &items, billing)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CheckoutResponse {
            order_id: order.id,
            order_number: order.order_number,
            total,
            status: order.status,
        })),
    ))
}

pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/", post(create_order_from_cart))
}
