//! Gatehouse DB - Database abstractions
//!
//! SQLx-based storage layer for the credential and action-token stores.
//! The database is the sole arbiter of the uniqueness and single-use
//! invariants; application code never relies on read-then-write.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/gatehouse").await?;
//! let repos = Repositories::new(pool);
//!
//! let user = repos.users.find_by_email("user@example.com").await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, DbPool};
pub use repo::*;
