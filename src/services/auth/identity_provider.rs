//! Identity Provider 추상화
//!
//! 게이트웨이는 사용자 비밀번호나 연동 토큰을 직접 검증하지 않습니다.
//! 1차 자격 증명 검증은 이 trait 구현체가 담당하고, 검증된 uid만
//! `TokenService`로 전달되어 게이트웨이 토큰이 발급됩니다.

use async_trait::async_trait;
use crate::errors::AppResult;

/// 외부 Identity Provider 어댑터
///
/// 구현체는 요청 사이에 공유되므로 `Send + Sync`여야 하며,
/// 모든 메서드는 네트워크 호출 중 게이트웨이 내부 락을 잡지 않습니다.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 새 계정을 만들고 uid를 반환합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::ValidationError` - Provider가 요청을 거부 (중복 이메일, 약한 비밀번호 등)
    /// * `AppError::UpstreamError` - Provider에 연결할 수 없음
    async fn register(&self, email: &str, password: &str, name: Option<&str>) -> AppResult<String>;

    /// 이메일/비밀번호를 검증하고 uid를 반환합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::AuthenticationError` - 자격 증명 불일치
    /// * `AppError::UpstreamError` - Provider에 연결할 수 없음
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<String>;

    /// Provider가 발급한 ID 토큰을 검증하고 uid를 반환합니다.
    async fn verify_federated_token(&self, token: &str) -> AppResult<String>;

    /// 사용자의 Provider 측 세션을 모두 무효화합니다.
    async fn revoke_sessions(&self, uid: &str) -> AppResult<()>;
}
