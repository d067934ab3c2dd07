//! Gatehouse Types - Shared domain types
//!
//! This crate contains domain types used across Gatehouse crates:
//! - User identity and roles
//! - Action token kinds
//! - Public user views

pub mod auth;
pub mod role;
pub mod token;
pub mod user;

pub use auth::*;
pub use role::*;
pub use token::*;
pub use user::*;
