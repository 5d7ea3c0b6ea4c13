use actix_web::{get, web, HttpResponse};
use crate::services::auth::TokenService;

/// 게이트웨이 서명 공개키 (JWKS)
///
/// 백엔드 서비스가 게이트웨이 액세스 토큰을 직접 검증할 때 사용합니다.
///
/// # Endpoint
/// `GET /.well-known/jwks.json`
#[get("/.well-known/jwks.json")]
pub async fn jwks(tokens: web::Data<TokenService>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Cache-Control", "public, max-age=3600"))
        .json(tokens.keys().jwks())
}
