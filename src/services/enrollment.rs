use crate::{
    entities::{enrollment, Enrollment},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Writes and reads the append-only access records created by a completed
/// purchase.
#[derive(Clone)]
pub struct EnrollmentService {
    db: Arc<DatabaseConnection>,
}

impl EnrollmentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Enrolls the student in every listed course on the caller's
    /// connection. Inserts are conflict-tolerant on the (student, course)
    /// unique index, so replaying a confirmation cannot double-enroll.
    pub async fn enroll_many<C: ConnectionTrait>(
        &self,
        conn: &C,
        student_id: Uuid,
        course_ids: &[Uuid],
    ) -> Result<(), ServiceError> {
        let now = Utc::now();

        for &course_id in course_ids {
            let record = enrollment::ActiveModel {
                id: Set(Uuid::new_v4()),
                student_id: Set(student_id),
                course_id: Set(course_id),
                enrolled_at: Set(now),
            };

            Enrollment::insert(record)
                .on_conflict(
                    OnConflict::columns([
                        enrollment::Column::StudentId,
                        enrollment::Column::CourseId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<enrollment::Model>, ServiceError> {
        Ok(Enrollment::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .all(&*self.db)
            .await?)
    }
}
