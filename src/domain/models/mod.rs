//! 도메인 모델
//!
//! - [`token`] - 액세스 토큰 클레임, 리프레시 토큰 레코드, 토큰 쌍
//! - [`auth`] - 인증된 요청의 사용자 정보

pub mod token;
pub mod auth;

pub use token::*;
pub use auth::*;
