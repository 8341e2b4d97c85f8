use crate::{
    entities::order,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{cart::CartService, enrollment::EnrollmentService, orders::OrderService},
};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Provider-issued handle the payer must visit to approve payment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentApproval {
    /// Provider payment id; stamped onto the order for later correlation
    pub payment_id: String,
    /// Consumer-facing redirect URL
    pub approval_url: String,
}

/// Result of a provider-side capture call.
#[derive(Debug, Clone)]
pub struct PaymentCapture {
    pub payment_id: String,
    pub state: String,
}

/// External payment processor capability. Implementations talk to one
/// provider; the confirmation orchestration never depends on which.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Requests payment authorization for the order's total and returns the
    /// approval handle. No local state is persisted.
    async fn initiate(&self, order: &order::Model) -> Result<PaymentApproval, ServiceError>;

    /// Finalizes an approved payment into settled funds.
    async fn capture(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<PaymentCapture, ServiceError>;
}

/// Summary returned once a payment is confirmed and the order finalized.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentConfirmation {
    pub order_id: Uuid,
    pub order_number: String,
    pub status: String,
    pub enrolled_course_ids: Vec<Uuid>,
}

/// Orchestrates the payment leg of a purchase: initiation against the
/// gateway, then capture and order finalization on the provider's redirect.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<OrderService>,
    enrollments: Arc<EnrollmentService>,
    cart: Arc<CartService>,
    event_sender: Arc<EventSender>,
}

impl PaymentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<OrderService>,
        enrollments: Arc<EnrollmentService>,
        cart: Arc<CartService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            gateway,
            orders,
            enrollments,
            cart,
            event_sender,
        }
    }

    /// Asks the gateway to authorize the user's most recent pending order
    /// and stamps the provider payment id onto it, so the confirmation
    /// callback can resolve the order by an explicit key.
    #[instrument(skip(self))]
    pub async fn initiate_payment(&self, user_id: Uuid) -> Result<PaymentApproval, ServiceError> {
        let order = self.orders.latest_pending_for_user(user_id).await?;
        let approval = self.gateway.initiate(&order).await?;

        let order = self
            .orders
            .set_payment_reference(order, &approval.payment_id)
            .await?;

        self.event_sender
            .send_or_log(Event::PaymentInitiated {
                order_id: order.id,
                payment_id: approval.payment_id.clone(),
            })
            .await;

        info!(order_id = %order.id, payment_id = %approval.payment_id, "Payment initiated");
        Ok(approval)
    }

    /// Captures the payment at the provider, then finalizes the order:
    /// enrollments, the status transition and the cart clear commit in one
    /// transaction. A capture failure leaves the order pending and the cart
    /// intact; a finalization failure rolls everything back together.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn confirm_payment(
        &self,
        user_id: Uuid,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<PaymentConfirmation, ServiceError> {
        let capture = match self.gateway.capture(payment_id, payer_id).await {
            Ok(capture) => capture,
            Err(e) => {
                warn!(payment_id = %payment_id, error = %e, "Payment capture failed");
                self.event_sender
                    .send_or_log(Event::PaymentFailed {
                        payment_id: payment_id.to_string(),
                        reason: e.to_string(),
                    })
                    .await;
                return Err(e);
            }
        };

        let order = self
            .orders
            .find_by_payment_reference(user_id, payment_id)
            .await?;
        let items = self.orders.items_for_order(order.id).await?;
        let course_ids: Vec<Uuid> = items.iter().map(|item| item.course_id).collect();

        let txn = self.db.begin().await?;
        self.enrollments
            .enroll_many(&txn, user_id, &course_ids)
            .await?;
        let order = self.orders.mark_completed(&txn, order).await?;
        self.cart.clear_for_user(&txn, user_id).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::PaymentCaptured {
                order_id: order.id,
                payment_id: capture.payment_id.clone(),
            })
            .await;
        self.event_sender
            .send_or_log(Event::OrderCompleted(order.id))
            .await;
        self.event_sender.send_or_log(Event::CartCleared(user_id)).await;
        for &course_id in &course_ids {
            self.event_sender
                .send_or_log(Event::EnrollmentCreated {
                    student_id: user_id,
                    course_id,
                })
                .await;
        }

        info!(
            order_id = %order.id,
            payment_id = %capture.payment_id,
            courses = course_ids.len(),
            "Payment captured and order finalized"
        );

        Ok(PaymentConfirmation {
            order_id: order.id,
            order_number: order.order_number,
            status: order.status,
            enrolled_course_ids: course_ids,
        })
    }
}
