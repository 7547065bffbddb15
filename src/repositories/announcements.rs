use sqlx::PgPool;

use crate::db::models::Announcement;

const COLUMNS: &str = "id, course_id, author_id, title, message, created_at";

pub(crate) async fn create(
    pool: &PgPool,
    announcement: &Announcement,
) -> Result<Announcement, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(&format!(
        "INSERT INTO announcements (id, course_id, author_id, title, message, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}",
    ))
    .bind(&announcement.id)
    .bind(&announcement.course_id)
    .bind(&announcement.author_id)
    .bind(&announcement.title)
    .bind(&announcement.message)
    .bind(announcement.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_by_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as::<_, Announcement>(&format!(
        "SELECT {COLUMNS} FROM announcements
         WHERE course_id = $1
         ORDER BY created_at DESC, seq DESC",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
