use crate::{
    entities::{course, Course},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseInput {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// Catalog reads plus teacher-facing course creation.
#[derive(Clone)]
pub struct CourseService {
    db: Arc<DatabaseConnection>,
}

impl CourseService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_course(
        &self,
        teacher_id: Uuid,
        input: CreateCourseInput,
    ) -> Result<course::Model, ServiceError> {
        input.validate()?;

        if input.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }

        let now = Utc::now();
        let course = course::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            description: Set(input.description),
            price: Set(input.price),
            teacher_id: Set(teacher_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let course = course.insert(&*self.db).await?;
        info!(course_id = %course.id, "Course created");
        Ok(course)
    }

    #[instrument(skip(self))]
    pub async fn get_course(&self, course_id: Uuid) -> Result<course::Model, ServiceError> {
        Course::find_by_id(course_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Course {} not found", course_id)))
    }

    /// Lists catalog entries, newest first.
    #[instrument(skip(self))]
    pub async fn list_courses(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<course::Model>, u64), ServiceError> {
        let paginator = Course::find()
            .order_by_desc(course::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let courses = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((courses, total))
    }
}
