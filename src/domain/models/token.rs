//! 액세스 토큰 클레임, 리프레시 토큰 레코드, 발급 토큰 쌍
//!
//! 액세스 토큰은 저장되지 않는 순수 함수 결과(클레임 + 개인키)이고,
//! 리프레시 토큰은 메모리 저장소에 `{token, uid, created_at, expires_at}`로 보관됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 게이트웨이가 발급하는 모든 액세스 토큰의 고정 발급자
pub const TOKEN_ISSUER: &str = "gateway";

/// 액세스 토큰 클레임
///
/// 동적 클레임 맵 대신 고정된 구조만 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 사용자 ID
    pub sub: String,
    /// 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// 발급자 (항상 [`TOKEN_ISSUER`])
    pub iss: String,
}

impl AccessClaims {
    /// `now`부터 `ttl` 동안 유효한 클레임을 만듭니다.
    ///
    /// 만료 시각이 표현 범위를 넘으면 `None`입니다.
    pub fn new(uid: &str, now: DateTime<Utc>, ttl: chrono::Duration) -> Option<Self> {
        let expires_at = now.checked_add_signed(ttl)?;

        Some(Self {
            sub: uid.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        })
    }
}

/// 리프레시 토큰 저장 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    /// 불투명한 URL-safe 토큰 문자열 (저장소 키와 동일)
    pub token: String,
    /// 토큰 소유자
    pub uid: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// `now >= expires_at`이면 만료입니다.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// 로그인/갱신 시 발급되는 토큰 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub uid: String,
    pub access_token: String,
    pub refresh_token: String,
    /// 액세스 토큰 수명 (초)
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_expire_after_ttl() {
        let now = Utc::now();
        let claims = AccessClaims::new("u1", now, chrono::Duration::minutes(30)).unwrap();

        assert_eq!(claims.exp - claims.iat, 1800);
        assert_eq!(claims.iss, TOKEN_ISSUER);
    }

    #[test]
    fn test_claims_with_unrepresentable_expiry_are_rejected() {
        assert!(AccessClaims::new("u1", Utc::now(), chrono::Duration::MAX).is_none());
    }
}
