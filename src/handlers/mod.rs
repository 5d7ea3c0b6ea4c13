//! # HTTP Request Handlers Module
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//!   Client (Browser, Mobile App, API Client)
//! └─────────────────────┬───────────────────────┘
//!                       │ HTTP Request/Response
//! ┌─────────────────────▼───────────────────────┐
//!   RateLimit → (AuthGuard) → Handlers (이 모듈)
//! ├─────────────────────────────────────────────┤
//!   Services - 토큰, Identity Provider, 프록시
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## 모듈 구성
//!
//! - **`auth`**: 회원가입, 비밀번호 로그인, ID 토큰 로그인
//! - **`token_handlers`**: 토큰 갱신(rotation), 로그아웃
//! - **`proxy`**: 보호된 업스트림으로의 요청 전달
//! - **`jwks`**: 서명 공개키 노출
//!
//! 모든 핸들러는 `Result<HttpResponse, AppError>`를 반환하며,
//! 에러는 `{"error": "..."}` 본문으로 변환됩니다. (로그아웃은 항상 200)

pub mod auth;
pub mod token_handlers;
pub mod proxy;
pub mod jwks;
