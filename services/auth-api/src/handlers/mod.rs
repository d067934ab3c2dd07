//! HTTP handlers

mod auth;
mod health;
mod users;

pub use auth::{forgot_password, login, profile, register, reset_password, verify_email};
pub use health::{health, ready};
pub use users::{delete_user, edit_user, list_users};
