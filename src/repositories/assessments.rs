use sqlx::PgPool;

use crate::db::models::Assessment;

const COLUMNS: &str = "\
    id, course_id, kind, title, description, questions, total_points, passing_score, \
    available_from, due_at, created_by, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Assessment>, sqlx::Error> {
    sqlx::query_as::<_, Assessment>(&format!("SELECT {COLUMNS} FROM assessments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create(pool: &PgPool, assessment: &Assessment) -> Result<Assessment, sqlx::Error> {
    sqlx::query_as::<_, Assessment>(&format!(
        "INSERT INTO assessments (
            id, course_id, kind, title, description, questions, total_points,
            passing_score, available_from, due_at, created_by, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
        RETURNING {COLUMNS}",
    ))
    .bind(&assessment.id)
    .bind(&assessment.course_id)
    .bind(assessment.kind)
    .bind(&assessment.title)
    .bind(&assessment.description)
    .bind(&assessment.questions)
    .bind(assessment.total_points)
    .bind(assessment.passing_score)
    .bind(assessment.available_from)
    .bind(assessment.due_at)
    .bind(&assessment.created_by)
    .bind(assessment.created_at)
    .fetch_one(pool)
    .await
}
