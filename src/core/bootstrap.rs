use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;

/// Creates the operator account named by `FIRST_ADMIN_ID` when it is missing.
pub(crate) async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_id.is_empty() {
        tracing::warn!("FIRST_ADMIN_ID not configured; skipping admin creation");
        return Ok(());
    }

    if let Some(existing) = state.store().find_user(&admin.first_admin_id).await? {
        if existing.role != UserRole::Admin || !existing.is_active {
            tracing::warn!(
                user_id = %existing.id,
                "FIRST_ADMIN_ID refers to a non-admin or inactive user"
            );
        } else {
            tracing::info!(user_id = %existing.id, "Default admin already present");
        }
        return Ok(());
    }

    state
        .store()
        .insert_user(User {
            id: admin.first_admin_id.clone(),
            display_name: admin.first_admin_name.clone(),
            role: UserRole::Admin,
            is_active: true,
            created_at: primitive_now_utc(),
        })
        .await?;

    tracing::info!(user_id = %admin.first_admin_id, "Created default admin");
    Ok(())
}
