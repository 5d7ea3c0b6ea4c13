//! 인증 게이트웨이
//!
//! 백엔드 서비스 앞단에서 인증을 전담하는 Rust 기반 게이트웨이입니다.
//! 외부 Identity Provider로 사용자를 확인한 뒤 자체 RS256 액세스 토큰과
//! 1회용 리프레시 토큰을 발급하고, 보호된 경로의 요청을 검증 후 백엔드로 전달합니다.
//!
//! # Features
//!
//! - **토큰 발급**: RS256 액세스 토큰, rotation 되는 리프레시 토큰
//! - **Identity Provider 연동**: 회원가입, 비밀번호 로그인, ID 토큰 로그인, 세션 폐기
//! - **Rate Limiting**: 클라이언트별 고정 윈도우
//! - **리버스 프록시**: 경로 접두사 → 백엔드 오리진 정적 라우팅
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   RateLimit     │ ← 모든 요청
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Routes/AuthGuard│ ← 인증 API / 보호된 업스트림 스코프
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 토큰, Identity Provider, 프록시
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use auth_gateway::state::AppState;
//! use auth_gateway::routes::configure_all_routes;
//!
//! let state = AppState::from_env()?;
//! let app = App::new().configure(|cfg| configure_all_routes(cfg, &state));
//! ```

pub mod config;
pub mod domain;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod errors;
pub mod middlewares;
pub mod state;
