//! Common test utilities for gatehouse-core integration tests

pub mod mock_repos;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gatehouse_core::{AuthConfig, AuthService, DeliveryError, Mailer, RegisterInput};

#[allow(unused_imports)]
pub use mock_repos::{MockActionTokenRepository, MockUserRepository};

/// A captured outbound email
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl SentMail {
    /// Pull the action secret out of the embedded link
    pub fn secret(&self) -> String {
        self.html
            .split("token=")
            .nth(1)
            .expect("mail body carries a token link")
            .split('"')
            .next()
            .unwrap()
            .to_string()
    }
}

/// Records messages instead of delivering them; can be told to fail
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> SentMail {
        self.sent
            .lock()
            .unwrap()
            .last()
            .expect("at least one mail sent")
            .clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected {
                status: 503,
                body: "simulated outage".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

pub type TestService = AuthService<MockUserRepository, MockActionTokenRepository>;

/// A fully wired service over in-memory stores and a recording mailer
pub struct Harness {
    pub service: Arc<TestService>,
    pub users: MockUserRepository,
    pub tokens: MockActionTokenRepository,
    pub mailer: Arc<RecordingMailer>,
}

/// Signing secret shared by the harness and token-forging helpers
pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret!";

pub fn test_config() -> AuthConfig {
    AuthConfig::new(JWT_SECRET, "http://localhost:4000").unwrap()
}

pub fn harness() -> Harness {
    let config = test_config();
    let users = MockUserRepository::new();
    let tokens = MockActionTokenRepository::new(users.clone());
    let mailer = Arc::new(RecordingMailer::default());
    let service = Arc::new(AuthService::new(
        config,
        Arc::new(users.clone()),
        Arc::new(tokens.clone()),
        mailer.clone(),
    ));
    Harness {
        service,
        users,
        tokens,
        mailer,
    }
}

/// Register a user and return the verification secret captured from
/// the outbound mail
pub async fn register(
    h: &Harness,
    username: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> String {
    h.service
        .register(RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.map(|r| r.to_string()),
        })
        .await
        .expect("registration succeeds");
    h.mailer.last().secret()
}

/// Register and verify in one step, returning a login bearer token
pub async fn register_verified(
    h: &Harness,
    username: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> String {
    let secret = register(h, username, email, password, role).await;
    h.service
        .verify_email(&secret)
        .await
        .expect("verification succeeds");
    h.service.login(email, password).await.expect("login succeeds")
}
