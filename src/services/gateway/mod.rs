//! 게이트웨이 트래픽 서비스
//!
//! - [`RateLimiter`]: 클라이언트별 고정 윈도우 요청 제한
//! - [`ProxyService`]: 인증된 요청을 백엔드 오리진으로 전달

pub mod rate_limiter;
pub mod proxy_service;

pub use rate_limiter::*;
pub use proxy_service::*;
