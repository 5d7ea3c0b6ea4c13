//! 인증 요청 DTO
//!
//! 인증 엔드포인트로 들어오는 JSON 본문을 매핑합니다.
use serde::Deserialize;
use validator::Validate;

/// 회원가입 요청 구조체 (`POST /register`)
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    /// 표시 이름 (선택사항)
    #[serde(default)]
    pub name: Option<String>,
}

/// 이메일/비밀번호 로그인 요청 구조체 (`POST /login-basic`)
#[derive(Debug, Deserialize, Validate)]
pub struct BasicLoginRequest {
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 연합 토큰 로그인 요청 구조체 (`POST /login`)
#[derive(Debug, Deserialize, Validate)]
pub struct FederatedLoginRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

/// 리프레시 토큰 요청 구조체 (`POST /refresh`)
///
/// 본문이 비어 있으면 `refresh_token` 쿠키를 확인합니다.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// 로그아웃 요청 구조체 (`POST /logout`)
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: String,

    /// Identity Provider 측 세션까지 폐기할지 여부
    #[serde(default, alias = "revoke_firebase")]
    pub revoke_upstream: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "secret123".to_string(),
            name: None,
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            name: Some("Kim".to_string()),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_logout_request_accepts_legacy_flag() {
        let req: LogoutRequest =
            serde_json::from_str(r#"{"refresh_token":"abc","revoke_firebase":true}"#).unwrap();

        assert_eq!(req.refresh_token, "abc");
        assert!(req.revoke_upstream);
    }

    #[test]
    fn test_logout_request_fields_default() {
        let req: LogoutRequest = serde_json::from_str("{}").unwrap();

        assert!(req.refresh_token.is_empty());
        assert!(!req.revoke_upstream);
    }
}
