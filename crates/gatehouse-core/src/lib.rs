//! Gatehouse Core - Credential and session lifecycle
//!
//! Core authentication functionality: password hashing, session token
//! issuance and verification, single-use action tokens, and the auth
//! service state machine that orchestrates them.

pub mod config;
pub mod error;
pub mod mailer;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use mailer::{DeliveryError, HttpMailer, LogMailer, Mailer};
pub use service::{AuthService, EditUserInput, RegisterInput};
pub use token::TokenCodec;
