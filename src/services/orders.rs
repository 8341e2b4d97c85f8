use crate::{
    entities::{
        order::{self, OrderStatus},
        order_item, Order, OrderItem,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Order reads and the status transition. Creation happens in
/// [`crate::services::CheckoutService`]; after that, only the confirmation
/// flow mutates an order.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The user's most recently created pending order. Payment initiation
    /// targets this order, immediately after checkout created it.
    #[instrument(skip(self))]
    pub async fn latest_pending_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<order::Model, ServiceError> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending.to_string()))
            .order_by_desc(order::Column::CreatedAt)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user_id, "No pending order for payment initiation");
                ServiceError::NotFound("no pending order".to_string())
            })
    }

    /// Resolves the order a provider callback refers to. The provider
    /// payment id was stamped onto the order when payment was initiated, so
    /// this is an exact key lookup scoped to the authenticated user.
    #[instrument(skip(self))]
    pub async fn find_by_payment_reference(
        &self,
        user_id: Uuid,
        payment_id: &str,
    ) -> Result<order::Model, ServiceError> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::PaymentReference.eq(payment_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user_id, payment_id = %payment_id, "No order for payment reference");
                ServiceError::NotFound("no order matches this payment".to_string())
            })
    }

    /// Stamps the provider payment id onto the order.
    #[instrument(skip(self))]
    pub async fn set_payment_reference(
        &self,
        order: order::Model,
        payment_id: &str,
    ) -> Result<order::Model, ServiceError> {
        let mut active: order::ActiveModel = order.into();
        active.payment_reference = Set(Some(payment_id.to_string()));
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn items_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        Ok(OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?)
    }

    /// Marks an order completed on the caller's connection, so finalization
    /// can commit it together with enrollments and the cart clear.
    pub async fn mark_completed<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: order::Model,
    ) -> Result<order::Model, ServiceError> {
        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Completed.to_string());
        active.updated_at = Set(Some(Utc::now()));
        Ok(active.update(conn).await?)
    }
}
