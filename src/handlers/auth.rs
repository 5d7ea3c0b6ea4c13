//! Authentication HTTP Handlers
//!
//! 1차 자격 증명은 Identity Provider가 검증하고, 검증된 uid로
//! 게이트웨이 토큰 쌍을 발급합니다.
//!
//! # Endpoints
//!
//! - `POST /register`, `/register-basic` - 계정 생성
//! - `POST /login-basic` - 이메일/비밀번호 로그인
//! - `POST /login` - Identity Provider ID 토큰으로 로그인
use actix_web::{post, routes, web, HttpResponse};
use validator::Validate;
use crate::domain::{
    BasicLoginRequest, FederatedLoginRequest, RegisterRequest, RegisterResponse, TokenPair,
    TokenResponse,
};
use crate::errors::AppError;
use crate::services::auth::{IdentityProvider, TokenService};
use crate::utils::access_token_cookie;

/// 회원가입 핸들러
///
/// # Endpoint
/// `POST /register` (`/register-basic`)
///
/// # Request
/// ```json
/// { "email": "user@example.com", "password": "secret1", "name": "Alice" }
/// ```
#[routes]
#[post("/register")]
#[post("/register-basic")]
pub async fn register(
    payload: web::Json<RegisterRequest>,
    identity: web::Data<dyn IdentityProvider>,
) -> Result<HttpResponse, AppError> {
    // 유효성 검사
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let uid = identity
        .register(&payload.email, &payload.password, payload.name.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        uid,
        message: "user registered".to_string(),
    }))
}

/// 이메일/비밀번호 로그인 핸들러
///
/// # Endpoint
/// `POST /login-basic`
///
/// # Response
/// `{access_token, refresh_token, uid, expires_in}` + `access_token` 쿠키
#[post("/login-basic")]
pub async fn login_basic(
    payload: web::Json<BasicLoginRequest>,
    identity: web::Data<dyn IdentityProvider>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let uid = identity.sign_in(&payload.email, &payload.password).await?;
    let pair = tokens.issue_token_pair(&uid)?;

    log::info!("✅ 비밀번호 로그인 성공 - uid: {}", uid);

    Ok(token_response(&tokens, &pair).json(TokenResponse::with_expiry(pair)))
}

/// ID 토큰 로그인 핸들러
///
/// # Endpoint
/// `POST /login`
///
/// # Request
/// ```json
/// { "token": "<identity provider ID token>" }
/// ```
#[post("/login")]
pub async fn login(
    payload: web::Json<FederatedLoginRequest>,
    identity: web::Data<dyn IdentityProvider>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let uid = identity.verify_federated_token(&payload.token).await?;
    let pair = tokens.issue_token_pair(&uid)?;

    log::info!("✅ ID 토큰 로그인 성공 - uid: {}", uid);

    Ok(token_response(&tokens, &pair).json(TokenResponse::with_uid(pair)))
}

/// 액세스 토큰 쿠키가 붙은 200 응답 빌더
pub(crate) fn token_response(tokens: &TokenService, pair: &TokenPair) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder.cookie(access_token_cookie(&pair.access_token, tokens.access_ttl_secs()));
    builder
}
