use crate::{
    entities::{course, Course},
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Resolves the authoritative unit price for a catalog entry. Every
/// resolution is a fresh point lookup; nothing is cached.
#[derive(Clone)]
pub struct PricingService {
    db: Arc<DatabaseConnection>,
}

impl PricingService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn price_of(&self, course_id: Uuid) -> Result<Decimal, ServiceError> {
        let course: Option<course::Model> = Course::find_by_id(course_id).one(&*self.db).await?;

        course
            .map(|c| c.price)
            .ok_or_else(|| ServiceError::NotFound(format!("Course {} not found", course_id)))
    }
}
