#![allow(dead_code)]

pub mod provider;

use std::path::Path;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};
use uuid::Uuid;
use vidhub::entities::{user, video};
use vidhub::services::users::create_user;
use vidhub::services::videos::NewVideo;

/// In-memory SQLite with the video schema built from the entities.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();
    db.execute(backend.build(&schema.create_table_from_entity(user::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(video::Entity)))
        .await
        .unwrap();

    db
}

pub async fn owner(db: &DatabaseConnection, username: &str) -> Uuid {
    create_user(db, username).await.unwrap().id
}

pub fn new_video(owner_id: Uuid, title: &str) -> NewVideo {
    NewVideo {
        video_file: "https://cdn/x.mp4".to_string(),
        thumbnail: "https://cdn/x.jpg".to_string(),
        owner_id,
        title: title.to_string(),
        description: "D".to_string(),
        duration_seconds: 120.0,
    }
}

pub fn file_count(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

/// Builds a `multipart/form-data` body. Entries with a filename become file parts.
pub fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
