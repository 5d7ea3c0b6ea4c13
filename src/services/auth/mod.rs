//! 인증 및 토큰 서비스 모듈
//!
//! # Features
//!
//! - RSA 서명 키 로드 및 JWKS 노출 ([`KeyMaterial`])
//! - RS256 액세스 토큰 발급/검증, 리프레시 토큰 rotation ([`TokenService`])
//! - 외부 Identity Provider 연동 ([`IdentityProvider`], [`FirebaseIdentityProvider`])
//!
//! # Examples
//!
//! ```rust,ignore
//! use auth_gateway::services::auth::{KeyMaterial, TokenService};
//!
//! let keys = Arc::new(KeyMaterial::from_bundle(&bundle)?);
//! let token_service = TokenService::new(keys, Duration::minutes(30), Duration::days(7));
//! let pair = token_service.issue_token_pair("u1")?;
//! ```

pub mod key_material;
pub mod token_service;
pub mod identity_provider;
pub mod firebase_identity_provider;

pub use key_material::*;
pub use token_service::*;
pub use identity_provider::*;
pub use firebase_identity_provider::*;
