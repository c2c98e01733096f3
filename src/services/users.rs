use chrono::{SubsecRound, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::user;
use crate::error::AppError;

/// Minimal owner records, referenced by videos.
pub async fn create_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::invalid("username is required"));
    }

    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest(format!("username '{}' already exists", username)));
    }

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        created_at: Set(Utc::now().naive_utc().trunc_subsecs(6)),
    };

    let created = user.insert(db).await?;
    tracing::info!(user_id = %created.id, username = %created.username, "User created");
    Ok(created)
}
