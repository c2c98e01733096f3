use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::video;
use crate::error::AppError;
use crate::pagination::{PageResponse, Pagination};
use crate::response::ApiResponse;
use crate::services::assets::{self, AssetKind, LocalFile};
use crate::services::videos::{NewVideo, VideoFilter, VideoPatch};
use crate::state::AppState;

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    #[schema(value_type = String)]
    id: Uuid,
    video_file: String,
    thumbnail: String,
    #[schema(value_type = String)]
    owner_id: Uuid,
    title: String,
    description: String,
    duration_seconds: f64,
    views: i64,
    is_published: bool,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl From<video::Model> for VideoResponse {
    fn from(video: video::Model) -> Self {
        VideoResponse {
            id: video.id,
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            owner_id: video.owner_id,
            title: video.title,
            description: video.description,
            duration_seconds: video.duration_seconds,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VideoListFilter {
    /// Only videos owned by this user
    pub owner_id: Option<Uuid>,
    /// Defaults to true; pass false to include unpublished videos
    pub published_only: Option<bool>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateVideoRequest {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct PublishRequest {
    is_published: bool,
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart data".to_string()))
}

#[utoipa::path(
    post,
    path = "/videos",
    tag = "Videos",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video uploaded and recorded", body = VideoResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 502, description = "Upload provider failed"),
        (status = 504, description = "Upload provider timed out")
    )
)]
pub async fn create_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let mut video_file: Option<LocalFile> = None;
    let mut thumbnail: Option<LocalFile> = None;
    let mut title = None;
    let mut description = None;
    let mut owner_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" | "thumbnail" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::BadRequest("Failed to read file bytes".to_string()))?;
                if data.is_empty() {
                    continue;
                }
                let local = assets::stage(&state.upload_dir, &filename, &data).await?;
                if name == "video" {
                    video_file = Some(local);
                } else {
                    thumbnail = Some(local);
                }
            }
            "title" => title = Some(read_text(field).await?),
            "description" => description = Some(read_text(field).await?),
            "owner_id" => owner_id = Some(read_text(field).await?),
            _ => {}
        }
    }

    // Reject before anything is sent to the provider.
    let title = title.unwrap_or_default();
    let description = description.unwrap_or_default();
    let mut missing = Vec::new();
    if video_file.is_none() {
        missing.push("video file is required".to_string());
    }
    if thumbnail.is_none() {
        missing.push("thumbnail file is required".to_string());
    }
    let owner_id = match owner_id.as_deref().map(str::trim).map(Uuid::parse_str) {
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => {
            missing.push("owner_id must be a valid UUID".to_string());
            None
        }
        None => {
            missing.push("owner_id is required".to_string());
            None
        }
    };
    missing.extend(
        state
            .videos
            .check_details(owner_id, &title, &description)
            .await?,
    );
    if !missing.is_empty() {
        tracing::info!(errors = ?missing, "Upload | POST /videos | res=400");
        return Err(AppError::Validation(missing));
    }

    let (video_asset, thumbnail_asset) = tokio::join!(
        state.assets.resolve(video_file, AssetKind::Video),
        state.assets.resolve(thumbnail, AssetKind::Thumbnail),
    );
    let missing_asset = || AppError::Upload("no asset was uploaded".to_string());
    let video_asset = video_asset?.into_asset().ok_or_else(missing_asset)?;
    let thumbnail_asset = thumbnail_asset?.into_asset().ok_or_else(missing_asset)?;

    let created = state
        .videos
        .create(NewVideo {
            video_file: video_asset.url,
            thumbnail: thumbnail_asset.url,
            owner_id: owner_id.unwrap_or_default(),
            title,
            description,
            duration_seconds: video_asset.duration_seconds.unwrap_or_default(),
        })
        .await?;

    tracing::info!(video_id = %created.id, "Upload | POST /videos | res=201");
    Ok(ApiResponse::created(VideoResponse::from(created)).with_message("Video uploaded successfully"))
}

#[utoipa::path(
    get,
    path = "/videos",
    tag = "Videos",
    params(VideoListFilter, Pagination),
    responses(
        (status = 200, description = "Page of videos, newest first", body = [VideoResponse]),
        (status = 400, description = "Malformed cursor")
    )
)]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(filter): Query<VideoListFilter>,
    Query(pagination): Query<Pagination>,
) -> Result<ApiResponse<PageResponse<VideoResponse>>, AppError> {
    let filter = VideoFilter {
        owner_id: filter.owner_id,
        published_only: filter.published_only.unwrap_or(true),
    };
    let page_size = pagination.page_size();
    let page = state
        .videos
        .query_page(&filter, pagination.cursor()?, page_size)
        .await?;

    Ok(ApiResponse::ok(PageResponse::new(page, page_size)))
}

#[utoipa::path(
    get,
    path = "/videos/{id}",
    tag = "Videos",
    params(("id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video details", body = VideoResponse),
        (status = 404, description = "Video not found")
    )
)]
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let video = state.videos.get(id).await?;
    Ok(ApiResponse::ok(VideoResponse::from(video)))
}

#[utoipa::path(
    patch,
    path = "/videos/{id}",
    tag = "Videos",
    params(("id" = String, Path, description = "Video ID")),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVideoRequest>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let patch = VideoPatch {
        title: payload.title,
        description: payload.description,
    };
    let video = state.videos.update(id, patch).await?;
    Ok(ApiResponse::ok(VideoResponse::from(video)).with_message("Video updated successfully"))
}

#[utoipa::path(
    put,
    path = "/videos/{id}/publish",
    tag = "Videos",
    params(("id" = String, Path, description = "Video ID")),
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Publish state changed", body = VideoResponse),
        (status = 404, description = "Video not found")
    )
)]
pub async fn set_published(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishRequest>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let video = state.videos.set_published(id, payload.is_published).await?;
    Ok(ApiResponse::ok(VideoResponse::from(video)))
}

#[utoipa::path(
    post,
    path = "/videos/{id}/views",
    tag = "Videos",
    params(("id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "View recorded", body = VideoResponse),
        (status = 404, description = "Video not found")
    )
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<VideoResponse>, AppError> {
    let video = state.videos.record_view(id).await?;
    Ok(ApiResponse::ok(VideoResponse::from(video)))
}

#[utoipa::path(
    delete,
    path = "/videos/{id}",
    tag = "Videos",
    params(("id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    state.videos.delete(id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "id": id })).with_message("Video deleted successfully"))
}
