//! 게이트웨이 전역에서 사용하는 에러 시스템
//!
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 모든 요청 단위 에러를
//! `{"error": "..."}` 형식의 JSON 응답으로 변환합니다.
//! 요청 처리 중 발생한 에러는 핸들러 경계에서 응답으로 바뀌며 프로세스를 종료시키지 않습니다.
//! `ConfigError`만 예외로, 시작 단계에서 트래픽을 받기 전에 서버 기동을 중단시킵니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::AppError;
//!
//! fn require_token(body: &RefreshRequest) -> Result<&str, AppError> {
//!     if body.refresh_token.is_empty() {
//!         return Err(AppError::ValidationError("refresh_token is required".to_string()));
//!     }
//!     Ok(&body.refresh_token)
//! }
//! ```

use actix_web::http::StatusCode;
use actix_web::http::header;
use thiserror::Error;

/// 게이트웨이 전역 에러 타입
///
/// | 변형 | HTTP 상태 |
/// |------|-----------|
/// | `ConfigError` | 500 (시작 단계 전용) |
/// | `ValidationError` | 400 |
/// | `AuthenticationError` | 401 |
/// | `InvalidToken` / `ExpiredToken` | 401 |
/// | `RateLimitExceeded` | 429 |
/// | `UpstreamError` | 502 |
/// | `InternalError` | 500 |
#[derive(Error, Debug)]
pub enum AppError {
    /// 설정 누락/오류 (시작 단계에서 치명적)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 요청 필드 누락 또는 형식 오류 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 자격 증명 실패, 잘못된/만료된 액세스 토큰 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 저장소에 없는 리프레시 토큰 (401 Unauthorized)
    #[error("Authentication error: refresh token is invalid")]
    InvalidToken,

    /// 만료된 리프레시 토큰 (401 Unauthorized)
    #[error("Authentication error: refresh token has expired")]
    ExpiredToken,

    /// 클라이언트별 요청 한도 초과 (429 Too Many Requests)
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    /// Identity Provider 또는 백엔드 오리진 통신 실패 (502 Bad Gateway)
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationError(_) | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 에러 타입을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        let mut builder = actix_web::HttpResponse::build(self.status_code());

        if let AppError::RateLimitExceeded { retry_after_secs } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }

        builder.json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 내부 에러로 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 컨텍스트 정보와 함께 설정 에러로 변환합니다.
    fn config_context(self, msg: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn config_context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::ConfigError(format!("{}: {}", msg, e)))
    }
}
