pub mod config;
pub mod entities;
pub mod error;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
