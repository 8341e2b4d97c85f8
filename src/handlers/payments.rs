use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::payments::{PaymentApproval, PaymentConfirmation};
use crate::ApiResponse;
use axum::{
    extract::{Json, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

/// Query parameters the provider appends when redirecting the payer back.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProviderReturnParams {
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
    #[serde(rename = "PayerID")]
    pub payer_id: Option<String>,
}

/// Request an approval redirect for the caller's pending order
#[utoipa::path(
    post,
    path = "/api/v1/payments/create-paypal",
    responses(
        (status = 200, description = "Approval handle", body = crate::ApiResponse<crate::services::payments::PaymentApproval>),
        (status = 404, description = "No pending order", body = crate::errors::ErrorResponse),
        (status = 502, description = "Provider failure", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_paypal_payment(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<PaymentApproval>>, ServiceError> {
    let approval = state.services.payments.initiate_payment(user.user_id).await?;
    Ok(Json(ApiResponse::success(approval)))
}

/// Provider redirect target after the payer approves payment
#[utoipa::path(
    get,
    path = "/api/v1/payments/paypal-success",
    params(ProviderReturnParams),
    responses(
        (status = 200, description = "Payment captured and order finalized", body = crate::ApiResponse<crate::services::payments::PaymentConfirmation>),
        (status = 400, description = "Missing provider parameters", body = crate::errors::ErrorResponse),
        (status = 404, description = "No order for this payment", body = crate::errors::ErrorResponse),
        (status = 502, description = "Capture failed at the provider", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn paypal_success(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ProviderReturnParams>,
) -> Result<Json<ApiResponse<PaymentConfirmation>>, ServiceError> {
    let (payment_id, payer_id) = match (params.payment_id, params.payer_id) {
        (Some(payment_id), Some(payer_id)) if !payment_id.is_empty() && !payer_id.is_empty() => {
            (payment_id, payer_id)
        }
        _ => {
            return Err(ServiceError::BadRequest(
                "payment ID or payer ID not provided".to_string(),
            ))
        }
    };

    let confirmation = state
        .services
        .payments
        .confirm_payment(user.user_id, &payment_id, &payer_id)
        .await?;

    Ok(Json(ApiResponse::success(confirmation)))
}

/// Provider redirect target when the payer aborts. Nothing is read or
/// mutated; the pending order stays pending.
#[utoipa::path(
    get,
    path = "/api/v1/payments/paypal-cancel",
    responses(
        (status = 200, description = "Cancellation acknowledged", body = crate::ApiResponse<serde_json::Value>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn paypal_cancel(
    _user: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    Ok(Json(ApiResponse::success(json!({
        "message": "Payment canceled by the user",
        "status": "canceled",
    }))))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-paypal", post(create_paypal_payment))
        .route("/paypal-success", get(paypal_success))
        .route("/paypal-cancel", get(paypal_cancel))
}
