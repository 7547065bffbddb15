use sqlx::PgPool;

use crate::db::models::Course;

const COLUMNS: &str = "id, title, instructor_id, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create(pool: &PgPool, course: &Course) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, title, instructor_id, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNS}",
    ))
    .bind(&course.id)
    .bind(&course.title)
    .bind(&course.instructor_id)
    .bind(course.created_at)
    .fetch_one(pool)
    .await
}
