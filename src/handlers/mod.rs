pub mod admin_users;
pub mod articles;
pub mod auth;
pub mod comments;
pub mod events;
pub mod profile;
pub mod stats;
