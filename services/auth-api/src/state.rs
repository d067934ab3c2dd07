//! Application state

use std::ops::Deref;
use std::sync::Arc;

use gatehouse_core::{AuthService, HttpMailer, LogMailer, Mailer};
use gatehouse_db::pg::{PgActionTokenRepository, PgUserRepository, Repositories};
use gatehouse_db::DbPool;

use crate::config::Config;

/// Type alias for the auth service with concrete repository types
pub type AuthServiceImpl = AuthService<PgUserRepository, PgActionTokenRepository>;

/// Shared database pool wrapper for health checks
#[derive(Clone)]
pub struct SharedPool(Arc<DbPool>);

impl Deref for SharedPool {
    type Target = DbPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth service for the credential and token lifecycle
    pub auth: Arc<AuthServiceImpl>,
    /// Database connection pool (shared reference for health checks)
    pub pool: SharedPool,
}

impl AppState {
    /// Wire up repositories, mailer, and the auth service
    pub fn new(config: &Config, pool: DbPool) -> Self {
        let repos = Repositories::new(pool.clone());

        let mailer: Arc<dyn Mailer> = match &config.mail {
            Some(mail) => Arc::new(HttpMailer::new(
                mail.api_url.clone(),
                mail.api_key.clone(),
                mail.sender_email.clone(),
                mail.sender_name.clone(),
            )),
            None => {
                tracing::warn!("MAIL_API_KEY not set; outbound email will be logged, not sent");
                Arc::new(LogMailer)
            }
        };

        let auth = AuthService::new(
            config.auth.clone(),
            Arc::new(repos.users),
            Arc::new(repos.action_tokens),
            mailer,
        );

        Self {
            auth: Arc::new(auth),
            pool: SharedPool(Arc::new(pool)),
        }
    }
}
