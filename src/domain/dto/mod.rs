//! # Data Transfer Objects (DTO) Module
//!
//! HTTP 경계에서 주고받는 요청/응답 본문을 정의합니다.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
