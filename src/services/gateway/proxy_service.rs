//! 백엔드 리버스 프록시
//!
//! 인증을 통과한 요청을 경로 접두사에 고정된 백엔드 오리진으로 그대로 전달하고,
//! 백엔드 응답(상태, 헤더, 본문)을 그대로 돌려줍니다.
//!
//! - 메서드, 경로, 쿼리, 본문, end-to-end 헤더는 변경하지 않습니다.
//! - hop-by-hop 헤더와 `Host`는 양방향 모두 제거합니다.
//! - 호출자 주소를 `X-Forwarded-For`에 덧붙입니다.
//! - 재시도, 로드 밸런싱, 리다이렉트 추적은 하지 않습니다.
//!
//! 클라이언트 연결이 끊기면 핸들러 future가 drop 되면서 진행 중인
//! 백엔드 요청도 함께 취소됩니다.

use std::time::Duration;
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::stream;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use crate::errors::{AppError, AppResult, ErrorContext};

/// 프록시가 전달하지 않는 연결 단위 헤더
const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// 백엔드/Identity Provider 호출용 공유 HTTP 클라이언트를 만듭니다.
///
/// 리다이렉트는 따라가지 않고 호출자에게 그대로 돌려줍니다.
pub fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .config_context("Failed to build HTTP client")
}

/// 요청 전달 서비스
pub struct ProxyService {
    client: reqwest::Client,
}

impl ProxyService {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// 요청을 `origin`으로 전달하고 백엔드 응답을 그대로 돌려줍니다.
    ///
    /// 대상 URL은 `origin` + 원래 경로와 쿼리입니다.
    /// (`/api/users?page=2` → `http://java-service:8080/api/users?page=2`)
    ///
    /// # Errors
    ///
    /// * `AppError::UpstreamError` - 백엔드 연결 실패, 타임아웃, 응답 본문 수신 실패
    pub async fn forward(&self, req: &HttpRequest, body: web::Bytes, origin: &str) -> AppResult<HttpResponse> {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = format!("{}{}", origin, path_and_query);

        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .map_err(|e| AppError::ValidationError(format!("Unsupported method: {}", e)))?;

        let headers = upstream_headers(req);

        log::debug!("➡️ {} {} 프록시", method, target);

        let response = self
            .client
            .request(method, &target)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("백엔드 요청 실패 ({}): {}", origin, e);
                AppError::UpstreamError(format!("Backend {} is unavailable", origin))
            })?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| AppError::UpstreamError(format!("Invalid backend status: {}", e)))?;

        let mut builder = HttpResponse::build(status);
        let connection_scoped = connection_tokens(response.headers().get("connection").and_then(|v| v.to_str().ok()));
        for (name, value) in response.headers() {
            let name = name.as_str();
            // 본문 길이는 actix가 다시 계산
            if is_hop_by_hop(name, &connection_scoped) || name == "content-length" {
                continue;
            }
            builder.append_header((name, value.as_bytes()));
        }

        // 본문이 없는 응답은 백엔드가 알린 길이를 그대로 전달
        let declared_length = declared_content_length(response.headers());
        if req.method() == Method::HEAD {
            return Ok(match declared_length {
                Some(len) => builder
                    .no_chunking(len)
                    .streaming(stream::empty::<Result<web::Bytes, std::io::Error>>()),
                None => builder.finish(),
            });
        }
        if status == StatusCode::NOT_MODIFIED {
            if let Some(len) = declared_length {
                builder.insert_header(("content-length", len.to_string()));
            }
            return Ok(builder.finish());
        }

        let bytes = response.bytes().await.map_err(|e| {
            log::error!("백엔드 응답 수신 실패 ({}): {}", origin, e);
            AppError::UpstreamError(format!("Backend {} response was interrupted", origin))
        })?;

        Ok(builder.body(bytes))
    }
}

/// 인바운드 헤더를 백엔드 요청 헤더로 옮깁니다.
fn upstream_headers(req: &HttpRequest) -> HeaderMap {
    let incoming = req.headers();
    let connection_scoped = connection_tokens(
        incoming.get("connection").and_then(|v| v.to_str().ok()),
    );

    let mut headers = HeaderMap::new();
    for (name, value) in incoming.iter() {
        let lower = name.as_str();
        if lower == "host" || lower == "x-forwarded-for" || is_hop_by_hop(lower, &connection_scoped) {
            continue;
        }

        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(lower.as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }

    let peer = req.peer_addr().map(|addr| addr.ip().to_string());
    let prior = incoming
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let forwarded_for = match (prior, peer) {
        (Some(prior), Some(peer)) => Some(format!("{}, {}", prior, peer)),
        (Some(prior), None) => Some(prior.to_string()),
        (None, Some(peer)) => Some(peer),
        (None, None) => None,
    };
    if let Some(value) = forwarded_for.and_then(|v| HeaderValue::from_str(&v).ok()) {
        headers.insert("x-forwarded-for", value);
    }

    headers
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// `Connection` 헤더에 나열된 헤더 이름 (소문자)
fn connection_tokens(connection: Option<&str>) -> Vec<String> {
    connection
        .map(|raw| {
            raw.split(',')
                .map(|token| token.trim().to_ascii_lowercase())
                .filter(|token| !token.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn is_hop_by_hop(name: &str, connection_scoped: &[String]) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name) || connection_scoped.iter().any(|token| token == name)
}
