use sqlx::PgPool;

use crate::db::models::User;

const COLUMNS: &str = "id, display_name, role, is_active, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create(pool: &PgPool, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, display_name, role, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}",
    ))
    .bind(&user.id)
    .bind(&user.display_name)
    .bind(user.role)
    .bind(user.is_active)
    .bind(user.created_at)
    .fetch_one(pool)
    .await
}
