//! 공통 유틸리티 함수 모듈
//!
//! # Modules
//!
//! - [`request_utils`] - 클라이언트 식별, 토큰/쿠키 추출

pub mod request_utils;

pub use request_utils::*;
