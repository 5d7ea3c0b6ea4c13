//! # Configuration Module
//!
//! 게이트웨이의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 중앙집중식으로 관리합니다.
//!
//! ## 모듈 구성
//!
//! - [`server_config`] - 바인딩 주소, 워커 수, CORS
//! - [`auth_config`] - 자격 증명 번들, Identity Provider, 토큰 수명
//! - [`gateway_config`] - 업스트림 라우팅 테이블, Rate Limiting, 저장소 정리
//!
//! 필수 설정값이 없으면 `AppError::ConfigError`를 반환하며,
//! 이 에러는 서버가 트래픽을 받기 전에 기동을 중단시킵니다.

pub mod server_config;
pub mod auth_config;
pub mod gateway_config;

pub use server_config::*;
pub use auth_config::*;
pub use gateway_config::*;
