use crate::{
    entities::{cart_item, course, CartItem, Course},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// A cart row joined with its catalog entry.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: cart_item::Model,
    pub course: course::Model,
}

/// Manages pending purchase selections. One row per (user, course) pair,
/// enforced by the storage layer's unique index.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a course to the user's cart. A duplicate add surfaces as a
    /// conflict straight from the unique index, so concurrent adds of the
    /// same course cannot both succeed.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<cart_item::Model, ServiceError> {
        Course::find_by_id(course_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Course {} not found", course_id)))?;

        let now = Utc::now();
        let item = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            course_id: Set(course_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let item = item.insert(&*self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ServiceError::Conflict("course already in cart".to_string())
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        self.event_sender
            .send_or_log(Event::CartItemAdded { user_id, course_id })
            .await;

        info!(user_id = %user_id, course_id = %course_id, "Added course to cart");
        Ok(item)
    }

    /// Lists the user's cart, each row joined with its course.
    #[instrument(skip(self))]
    pub async fn items_for_user(&self, user_id: Uuid) -> Result<Vec<CartLine>, ServiceError> {
        let rows = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .find_also_related(Course)
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        rows.into_iter()
            .map(|(item, course)| {
                let course = course.ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "cart row {} references a missing course",
                        item.id
                    ))
                })?;
                Ok(CartLine { item, course })
            })
            .collect()
    }

    /// Removes one course from the user's cart.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, course_id: Uuid) -> Result<(), ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::CourseId.eq(course_id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("course not in cart".to_string()));
        }

        self.event_sender
            .send_or_log(Event::CartItemRemoved { user_id, course_id })
            .await;

        Ok(())
    }

    /// Deletes every cart row for the user. Takes the caller's connection so
    /// order finalization can run it inside its transaction.
    pub async fn clear_for_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<u64, ServiceError> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;

        Ok(result.rows_affected)
    }
}
