//! 미들웨어 모듈
//!
//! # 제공 미들웨어
//!
//! ### 1. Rate Limiting (RateLimit)
//! - 클라이언트별 고정 윈도우 요청 제한
//! - 앱 전체의 가장 바깥에 등록되어 다른 처리보다 먼저 실행
//! - 초과 시 `429` + `Retry-After`
//!
//! ### 2. 인증 (AuthGuard)
//! - `Authorization: Bearer` 헤더 또는 `access_token` 쿠키에서 토큰 추출
//! - RS256 서명/만료/발급자 검증
//! - 사용자 정보를 request extension에 저장
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! App::new()
//!     .wrap(RateLimit::new(state.rate_limiter.clone()))
//!     .service(
//!         web::scope("/api")
//!             .wrap(AuthGuard::new(state.token_service.clone()))
//!             .default_service(web::to(handlers::proxy::forward))
//!     )
//! ```

pub mod auth_middleware;
pub mod rate_limit_middleware;
mod auth_inner;

// 미들웨어 재export
pub use auth_middleware::AuthGuard;
pub use rate_limit_middleware::RateLimit;
