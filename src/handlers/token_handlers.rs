use actix_web::{post, routes, web, HttpRequest, HttpResponse};
use crate::domain::{LogoutRequest, MessageResponse, RefreshTokenRequest, TokenResponse};
use crate::errors::AppError;
use crate::handlers::auth::token_response;
use crate::services::auth::{IdentityProvider, TokenService};
use crate::utils::{cleared_access_token_cookie, cookie_value, REFRESH_TOKEN_COOKIE};

/// 토큰 갱신 API 핸들러
///
/// 리프레시 토큰은 본문의 `refresh_token`, 없으면 `refresh_token` 쿠키에서 찾습니다.
/// 사용된 토큰은 즉시 폐기되고 새 토큰이 발급됩니다.
#[post("/refresh")]
pub async fn refresh(
    req: HttpRequest,
    body: web::Bytes,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, AppError> {
    let payload: RefreshTokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshTokenRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("Invalid request body: {}", e)))?
    };

    let refresh_token = extract_refresh_token(&req, payload.refresh_token).ok_or_else(|| {
        AppError::AuthenticationError("refresh_token is required".to_string())
    })?;

    let pair = tokens.redeem_refresh_token(&refresh_token)?;

    Ok(token_response(&tokens, &pair).json(TokenResponse::tokens_only(pair)))
}

/// 로그아웃 API 핸들러
///
/// 제시된 리프레시 토큰만 폐기합니다. `revoke_upstream: true`이면
/// 해당 사용자의 모든 리프레시 토큰과 Identity Provider 세션까지 폐기합니다.
///
/// 본문이 없거나 잘못되어도, 토큰이 없어도 항상 `200 {message}`로 응답합니다.
#[routes]
#[post("/logout")]
#[post("/logout-basic")]
pub async fn logout(
    req: HttpRequest,
    body: web::Bytes,
    tokens: web::Data<TokenService>,
    identity: web::Data<dyn IdentityProvider>,
) -> HttpResponse {
    let payload: LogoutRequest = serde_json::from_slice(&body).unwrap_or_default();

    let revoked = extract_refresh_token(&req, payload.refresh_token)
        .and_then(|token| tokens.revoke_refresh_token(&token));

    if let (true, Some(record)) = (payload.revoke_upstream, revoked) {
        let dropped = tokens.revoke_all_for_user(&record.uid);
        log::info!("사용자 리프레시 토큰 전체 폐기 - uid: {}, {}개", record.uid, dropped);

        // 업스트림 실패는 로그아웃 결과에 영향을 주지 않음
        if let Err(e) = identity.revoke_sessions(&record.uid).await {
            log::error!("업스트림 세션 폐기 실패 - uid: {}, 에러: {}", record.uid, e);
        }
    }

    HttpResponse::Ok()
        .cookie(cleared_access_token_cookie())
        .json(MessageResponse::new("logged out"))
}

/// 본문 값을 우선 사용하고, 비어 있으면 쿠키에서 찾습니다.
fn extract_refresh_token(req: &HttpRequest, from_body: String) -> Option<String> {
    let from_body = from_body.trim();
    if !from_body.is_empty() {
        return Some(from_body.to_string());
    }

    cookie_value(req.headers(), REFRESH_TOKEN_COOKIE)
}
