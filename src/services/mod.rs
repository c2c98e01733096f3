pub mod assets;
pub mod upload;
pub mod users;
pub mod videos;
