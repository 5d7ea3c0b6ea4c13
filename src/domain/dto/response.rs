use serde::Serialize;
use crate::domain::models::TokenPair;

/// 회원가입 응답
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub uid: String,
    pub message: String,
}

/// 토큰 발급 응답
///
/// - `/login-basic`: `{access_token, refresh_token, uid, expires_in}`
/// - `/login`: `{access_token, refresh_token, uid}`
/// - `/refresh`: `{access_token, refresh_token}`
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// 토큰 쌍만 담은 응답 (`/refresh`)
    pub fn tokens_only(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            uid: None,
            expires_in: None,
        }
    }

    /// uid를 포함한 응답 (`/login`)
    pub fn with_uid(pair: TokenPair) -> Self {
        Self {
            uid: Some(pair.uid.clone()),
            ..Self::tokens_only(pair)
        }
    }

    /// uid와 만료 시간을 포함한 응답 (`/login-basic`)
    pub fn with_expiry(pair: TokenPair) -> Self {
        let expires_in = pair.expires_in;
        Self {
            expires_in: Some(expires_in),
            ..Self::with_uid(pair)
        }
    }
}

/// 단순 메시지 응답
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            uid: "u1".to_string(),
            access_token: "a.b.c".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 1800,
        }
    }

    #[test]
    fn test_response_shapes() {
        let refresh = serde_json::to_value(TokenResponse::tokens_only(pair())).unwrap();
        assert_eq!(refresh, serde_json::json!({"access_token": "a.b.c", "refresh_token": "r"}));

        let login = serde_json::to_value(TokenResponse::with_uid(pair())).unwrap();
        assert_eq!(login["uid"], "u1");
        assert!(login.get("expires_in").is_none());

        let basic = serde_json::to_value(TokenResponse::with_expiry(pair())).unwrap();
        assert_eq!(basic["uid"], "u1");
        assert_eq!(basic["expires_in"], 1800);
    }
}
