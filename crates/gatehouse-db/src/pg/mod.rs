//! PostgreSQL repository implementations

mod action_token;
mod user;

pub use action_token::PgActionTokenRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub action_tokens: PgActionTokenRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            action_tokens: PgActionTokenRepository::new(pool),
        }
    }
}
