//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 각 서비스는 자신의 저장소와 동기화를 직접 소유하며,
//! 시작 시 한 번 만들어져 [`crate::state::AppState`]를 통해 공유됩니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use auth_gateway::services::{auth::TokenService, gateway::RateLimiter};
//!
//! let limiter = RateLimiter::new(60, Duration::from_secs(60));
//! limiter.admit("203.0.113.9")?;
//! ```

pub mod auth;
pub mod gateway;
