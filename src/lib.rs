pub mod app;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extract;
pub mod posts;
pub mod state;
pub mod store;
pub mod users;
