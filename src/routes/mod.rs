mod home;
pub mod videos;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        home::root,
        videos::create_video,
        videos::list_videos,
        videos::get_video,
        videos::update_video,
        videos::set_published,
        videos::record_view,
        videos::delete_video,
    ),
    components(
        schemas(
            home::RootResponse,
            videos::VideoResponse,
            videos::UpdateVideoRequest,
            videos::PublishRequest,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Videos", description = "Video metadata, publishing and view counting")
    ),
    info(
        title = "VidHub API",
        version = "0.1.0",
        description = "Video hosting backend: metadata records for provider-hosted video assets",
    )
)]
struct ApiDoc;

/// Largest multipart body accepted for a video upload.
pub const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

pub fn create_routes(state: AppState) -> Router {
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let app_routes = Router::new()
        .route("/", get(home::root))
        .route("/videos", post(videos::create_video).get(videos::list_videos))
        .route(
            "/videos/{id}",
            get(videos::get_video)
                .patch(videos::update_video)
                .delete(videos::delete_video),
        )
        .route("/videos/{id}/publish", put(videos::set_published))
        .route("/videos/{id}/views", post(videos::record_view))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
