pub mod admin_user;
pub mod article;
pub mod auth;
pub mod comment;
pub mod event;
pub mod registration;
pub mod stats;
pub mod upload;
pub mod user;
