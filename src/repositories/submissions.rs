use sqlx::PgPool;

use crate::db::models::Submission;

pub(crate) const COLUMNS: &str = "\
    id, assessment_id, kind, course_id, student_id, content, answers, results, \
    auto_score, manual_score, total_score, grade_percent, passed, feedback, status, \
    submitted_at, graded_at, graded_by";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!("SELECT {COLUMNS} FROM submissions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_assessment(
    pool: &PgPool,
    assessment_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE assessment_id = $1 ORDER BY submitted_at, id",
    ))
    .bind(assessment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn create(pool: &PgPool, submission: &Submission) -> Result<Submission, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, assessment_id, kind, course_id, student_id, content, answers, results,
            auto_score, manual_score, total_score, grade_percent, passed, feedback, status,
            submitted_at, graded_at, graded_by
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
        RETURNING {COLUMNS}",
    ))
    .bind(&submission.id)
    .bind(&submission.assessment_id)
    .bind(submission.kind)
    .bind(&submission.course_id)
    .bind(&submission.student_id)
    .bind(&submission.content)
    .bind(&submission.answers)
    .bind(&submission.results)
    .bind(submission.auto_score)
    .bind(submission.manual_score)
    .bind(submission.total_score)
    .bind(submission.grade_percent)
    .bind(submission.passed)
    .bind(&submission.feedback)
    .bind(submission.status)
    .bind(submission.submitted_at)
    .bind(submission.graded_at)
    .bind(&submission.graded_by)
    .fetch_one(pool)
    .await
}

/// Writes the grading columns. Returns the number of rows touched.
pub(crate) async fn update_grading(pool: &PgPool, submission: &Submission) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE submissions
         SET results = $2,
             auto_score = $3,
             manual_score = $4,
             total_score = $5,
             grade_percent = $6,
             passed = $7,
             feedback = $8,
             status = $9,
             graded_at = $10,
             graded_by = $11
         WHERE id = $1",
    )
    .bind(&submission.id)
    .bind(&submission.results)
    .bind(submission.auto_score)
    .bind(submission.manual_score)
    .bind(submission.total_score)
    .bind(submission.grade_percent)
    .bind(submission.passed)
    .bind(&submission.feedback)
    .bind(submission.status)
    .bind(submission.graded_at)
    .bind(&submission.graded_by)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
