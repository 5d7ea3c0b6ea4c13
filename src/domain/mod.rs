//! # Domain Layer Module
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Models  - 토큰 클레임, 리프레시 토큰 레코드, 인증된 사용자
//! └── DTOs    - 요청/응답 본문
//! ```

pub mod dto;
pub mod models;

pub use dto::*;
pub use models::*;
