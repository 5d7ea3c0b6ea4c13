//! 요청 헤더/쿠키 처리 유틸리티

use std::net::SocketAddr;
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::http::header::{HeaderMap, AUTHORIZATION, COOKIE};

/// 액세스 토큰을 담는 HTTP-only 쿠키 이름
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// 리프레시 토큰을 담을 수 있는 쿠키 이름
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Rate Limiting에 사용할 클라이언트 식별자를 결정합니다.
///
/// # 우선순위
///
/// 1. `X-Forwarded-For`의 첫 번째 주소 (프록시 체인의 원본 클라이언트)
/// 2. `X-Real-IP`
/// 3. TCP 연결 주소
/// 4. `"unknown"`
pub fn resolve_client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded_for) = header_str(headers, "X-Forwarded-For") {
        if let Some(first) = forwarded_for.split(',').next().map(str::trim) {
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = header_str(headers, "X-Real-IP").map(str::trim) {
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `Authorization: Bearer <token>` 헤더, 없으면 `access_token` 쿠키에서 토큰을 꺼냅니다.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.trim().split_once(' ')?;
            scheme.eq_ignore_ascii_case("Bearer").then(|| token.trim())
        })
        .filter(|token| !token.is_empty());

    match bearer {
        Some(token) => Some(token.to_string()),
        None => cookie_value(headers, ACCESS_TOKEN_COOKIE),
    }
}

/// `Cookie` 헤더에서 이름이 일치하는 첫 번째 비어 있지 않은 값을 찾습니다.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .filter_map(|h| h.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| key.trim() == name && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
}

/// 로그인/갱신 응답에 붙이는 액세스 토큰 쿠키
pub fn access_token_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .finish()
}

/// 로그아웃 응답에 붙이는 만료 쿠키
pub fn cleared_access_token_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}
