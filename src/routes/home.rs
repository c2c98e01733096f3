use serde::Serialize;

use crate::response::ApiResponse;

#[derive(Serialize, utoipa::ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = RootResponse)
    ),
    tag = "General"
)]
pub async fn root() -> ApiResponse<RootResponse> {
    ApiResponse::ok(RootResponse {
        message: "Welcome to VidHub".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: vec![
            "/videos".to_string(),
            "/videos/{id}".to_string(),
            "/videos/{id}/publish".to_string(),
            "/videos/{id}/views".to_string(),
            "/swagger-ui".to_string(),
        ],
    })
}
