//! Persistent video records and their lifecycle.

use std::collections::VecDeque;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use futures::Stream;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{user, video};
use crate::error::AppError;
use crate::pagination::{clamp_page_size, Cursor, Page};
use crate::services::assets::normalize_ref;

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub video_file: String,
    pub thumbnail: String,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub duration_seconds: f64,
}

/// Fields to change on an existing record. `None` leaves a field untouched.
/// Asset references are fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub owner_id: Option<Uuid>,
    pub published_only: bool,
}

impl VideoFilter {
    pub fn published() -> Self {
        Self {
            owner_id: None,
            published_only: true,
        }
    }

    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            published_only: false,
        }
    }
}

// Stored timestamps round-trip through Postgres at microsecond precision.
fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

fn required_text(field: &str, value: &str, errors: &mut Vec<String>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(format!("{} is required", field));
    }
    trimmed.to_string()
}

fn asset_ref(field: &str, value: &str, errors: &mut Vec<String>) -> String {
    match normalize_ref(value) {
        Ok(url) => url,
        Err(AppError::Validation(reasons)) => {
            errors.extend(reasons.into_iter().map(|r| format!("{}: {}", field, r)));
            String::new()
        }
        Err(other) => {
            errors.push(format!("{}: {}", field, other));
            String::new()
        }
    }
}

#[derive(Clone)]
pub struct VideoStore {
    db: DatabaseConnection,
}

impl VideoStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists problems with the caller-supplied fields of a new record: blank
    /// title or description and an unknown owner. Assets are not looked at, so
    /// this can run before anything is uploaded.
    pub async fn check_details(
        &self,
        owner_id: Option<Uuid>,
        title: &str,
        description: &str,
    ) -> Result<Vec<String>, AppError> {
        let mut errors = Vec::new();
        required_text("title", title, &mut errors);
        required_text("description", description, &mut errors);

        if let Some(owner_id) = owner_id {
            let owner = user::Entity::find_by_id(owner_id).one(&self.db).await?;
            if owner.is_none() {
                errors.push(format!("owner {} does not exist", owner_id));
            }
        }
        Ok(errors)
    }

    pub async fn create(&self, new: NewVideo) -> Result<video::Model, AppError> {
        let mut errors = Vec::new();

        let video_file = asset_ref("video_file", &new.video_file, &mut errors);
        let thumbnail = asset_ref("thumbnail", &new.thumbnail, &mut errors);
        errors.extend(
            self.check_details(Some(new.owner_id), &new.title, &new.description)
                .await?,
        );
        if !new.duration_seconds.is_finite() || new.duration_seconds < 0.0 {
            errors.push("duration_seconds must be a non-negative number".to_string());
        }

        if !errors.is_empty() {
            tracing::debug!(errors = ?errors, "Rejected video record");
            return Err(AppError::Validation(errors));
        }

        let now = now();
        let record = video::ActiveModel {
            id: Set(Uuid::new_v4()),
            video_file: Set(video_file),
            thumbnail: Set(thumbnail),
            owner_id: Set(new.owner_id),
            title: Set(new.title.trim().to_string()),
            description: Set(new.description.trim().to_string()),
            duration_seconds: Set(new.duration_seconds),
            views: Set(0),
            is_published: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = record.insert(&self.db).await?;
        tracing::info!(video_id = %created.id, owner_id = %created.owner_id, "Video record created");
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<video::Model, AppError> {
        video::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    /// Adds one view in a single UPDATE so concurrent callers never lose a count.
    pub async fn record_view(&self, id: Uuid) -> Result<video::Model, AppError> {
        let result = video::Entity::update_many()
            .col_expr(video::Column::Views, Expr::col(video::Column::Views).add(1))
            .col_expr(video::Column::UpdatedAt, Expr::value(now()))
            .filter(video::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Video not found".to_string()));
        }

        self.get(id).await
    }

    pub async fn set_published(&self, id: Uuid, published: bool) -> Result<video::Model, AppError> {
        let result = video::Entity::update_many()
            .col_expr(video::Column::IsPublished, Expr::value(published))
            .col_expr(video::Column::UpdatedAt, Expr::value(now()))
            .filter(video::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Video not found".to_string()));
        }

        tracing::info!(video_id = %id, published, "Video publish state changed");
        self.get(id).await
    }

    /// Applies a partial edit. Only the supplied fields are validated.
    pub async fn update(&self, id: Uuid, patch: VideoPatch) -> Result<video::Model, AppError> {
        let existing = self.get(id).await?;

        if patch.is_empty() {
            return Err(AppError::invalid("at least one field must be supplied"));
        }

        let mut errors = Vec::new();
        let mut active = existing.into_active_model();

        if let Some(title) = patch.title {
            active.title = Set(required_text("title", &title, &mut errors));
        }
        if let Some(description) = patch.description {
            active.description = Set(required_text("description", &description, &mut errors));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        active.updated_at = Set(now());
        let updated = active.update(&self.db).await?;
        tracing::info!(video_id = %id, "Video record updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = video::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Video not found".to_string()));
        }
        tracing::info!(video_id = %id, "Video record deleted");
        Ok(())
    }

    /// Returns one page in `(created_at DESC, id DESC)` order, starting
    /// strictly after `cursor`.
    pub async fn query_page(
        &self,
        filter: &VideoFilter,
        cursor: Option<Cursor>,
        page_size: u64,
    ) -> Result<Page<video::Model>, AppError> {
        let page_size = clamp_page_size(Some(page_size));
        let mut query = video::Entity::find();

        if let Some(owner_id) = filter.owner_id {
            query = query.filter(video::Column::OwnerId.eq(owner_id));
        }
        if filter.published_only {
            query = query.filter(video::Column::IsPublished.eq(true));
        }
        if let Some(cursor) = cursor {
            query = query.filter(
                Condition::any()
                    .add(video::Column::CreatedAt.lt(cursor.created_at))
                    .add(
                        Condition::all()
                            .add(video::Column::CreatedAt.eq(cursor.created_at))
                            .add(video::Column::Id.lt(cursor.id)),
                    ),
            );
        }

        // One extra row tells whether another page exists.
        let mut items = query
            .order_by_desc(video::Column::CreatedAt)
            .order_by_desc(video::Column::Id)
            .limit(page_size + 1)
            .all(&self.db)
            .await?;

        let next_cursor = if items.len() as u64 > page_size {
            items.truncate(page_size as usize);
            items.last().map(|v| Cursor::new(v.created_at, v.id))
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }

    /// Lazily walks every matching record, one page per fetch.
    ///
    /// Pages are only requested as the stream is polled; dropping the stream
    /// stops further queries. Pass a cursor from `query_page` to resume.
    pub fn stream(
        &self,
        filter: VideoFilter,
        cursor: Option<Cursor>,
        page_size: u64,
    ) -> impl Stream<Item = Result<video::Model, AppError>> + Send + 'static {
        struct State {
            cursor: Option<Cursor>,
            buffer: VecDeque<video::Model>,
            exhausted: bool,
        }

        let store = self.clone();
        let init = State {
            cursor,
            buffer: VecDeque::new(),
            exhausted: false,
        };

        futures::stream::try_unfold(init, move |mut state| {
            let store = store.clone();
            let filter = filter.clone();
            async move {
                loop {
                    if let Some(item) = state.buffer.pop_front() {
                        return Ok::<_, AppError>(Some((item, state)));
                    }
                    if state.exhausted {
                        return Ok::<_, AppError>(None);
                    }

                    let page = store.query_page(&filter, state.cursor, page_size).await?;
                    state.exhausted = page.next_cursor.is_none();
                    state.cursor = page.next_cursor;
                    state.buffer.extend(page.items);
                }
            }
        })
    }
}
