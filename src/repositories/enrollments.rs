use sqlx::PgPool;

use crate::db::models::Enrollment;

const COLUMNS: &str = "id, course_id, student_id, enrolled_at";

pub(crate) async fn create(pool: &PgPool, enrollment: &Enrollment) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, course_id, student_id, enrolled_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNS}",
    ))
    .bind(&enrollment.id)
    .bind(&enrollment.course_id)
    .bind(&enrollment.student_id)
    .bind(enrollment.enrolled_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn exists(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE course_id = $1 AND student_id = $2)",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_student_ids(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT student_id FROM enrollments WHERE course_id = $1 ORDER BY seq",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}
