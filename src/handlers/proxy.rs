//! 보호된 업스트림 스코프의 기본 핸들러
//!
//! 인증 미들웨어를 통과한 요청만 여기에 도달합니다.

use actix_web::{web, HttpRequest, HttpResponse};
use crate::config::UpstreamRoute;
use crate::domain::models::AuthenticatedUser;
use crate::errors::AppError;
use crate::services::gateway::ProxyService;

/// 요청을 스코프에 고정된 백엔드 오리진으로 전달합니다.
///
/// 클라이언트가 연결을 끊으면 이 future가 drop 되면서 백엔드 요청도 취소됩니다.
pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    user: AuthenticatedUser,
    route: web::Data<UpstreamRoute>,
    proxy: web::Data<ProxyService>,
) -> Result<HttpResponse, AppError> {
    log::debug!("uid {} → {} {}", user.uid, route.origin, req.path());

    proxy.forward(&req, body, &route.origin).await
}
