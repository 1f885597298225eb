//! Driftlist sync service
//!
//! Server-side core of the synchronized task list: the authorization
//! gate, the sliding-window rate limiter, the mutation service, and the
//! subscription/query layer serving owner-scoped live views. Transport
//! and session issuance are external collaborators; this crate exposes
//! the call surface they dispatch into.

pub mod auth;
pub mod config;
pub mod error;
pub mod limiter;
pub mod service;
pub mod subscription;

pub use auth::Session;
pub use config::{RateLimitConfig, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use limiter::RateLimiter;
pub use service::{MAX_TEXT_LEN, TaskService};
pub use subscription::{EventBus, ListSubscription};
