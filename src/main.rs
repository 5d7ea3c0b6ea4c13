//! 인증 게이트웨이 메인 애플리케이션
//!
//! 설정을 읽어 서명 키, 토큰 서비스, Rate Limiter, Identity Provider, 프록시를 조립한 뒤
//! Actix-web HTTP 서버를 구동합니다. 필수 설정이 잘못되면 바인딩 전에 종료합니다.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use auth_gateway::config::{MaintenanceConfig, ServerConfig};
use auth_gateway::middlewares::RateLimit;
use auth_gateway::routes::configure_all_routes;
use auth_gateway::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (profile, env_file) = load_env_file();
    init_logging();

    info!("🚀 인증 게이트웨이 시작중... (profile: {})", profile);
    match env_file {
        Ok(file) => info!("{} 로드 완료", file),
        // 프로세스 환경 변수만으로도 기동 가능
        Err(reason) => warn!("env 파일을 읽지 못했습니다: {}", reason),
    }

    // ConfigError는 트래픽을 받기 전에 프로세스를 종료시킴
    let state = AppState::from_env().map_err(|e| {
        error!("❌ 설정 오류로 기동을 중단합니다: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("✅ 키/토큰/프록시 준비 완료 (kid: {})", state.token_service.keys().key_id());

    if let Some(every) = MaintenanceConfig::sweep_interval() {
        info!("🧹 저장소 정리 작업: {}초마다", every.as_secs());
        state.spawn_store_sweeper(every);
    }

    // HTTP 서버 시작
    start_http_server(state).await
}

/// 게이트웨이 HTTP 서버 구동
///
/// Rate Limiting이 가장 바깥에서 먼저 실행되고, 그 안에서 로깅과 CORS가 적용됩니다.
///
/// # Errors
///
/// 바인딩 실패 시 `std::io::Error`
async fn start_http_server(state: AppState) -> std::io::Result<()> {
    let bind_address = format!("{}:{}", ServerConfig::host(), ServerConfig::port());
    let workers = ServerConfig::workers();

    info!("🌐 Listening on http://{} ({} workers)", bind_address, workers);
    info!("🔗 업스트림 {}개 등록", state.upstreams.len());
    info!(
        "🛡️ Rate Limiting 활성화: 윈도우당 {}요청",
        state.rate_limiter.limit()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(configure_cors())
            .wrap(middleware::Logger::default())
            // 마지막 wrap이 가장 바깥
            .wrap(RateLimit::new(state.rate_limiter.clone()))

            // 라우트 설정
            .configure(|cfg| configure_all_routes(cfg, &state))
    })
        .bind(bind_address)?
        .workers(workers) // 워커 스레드 수
        .run()
        .await
}

/// `PROFILE`에 맞는 env 파일을 읽고, 로드 결과를 반환합니다
///
/// 로거 초기화 전에 호출되므로 결과는 `main`에서 기록합니다.
/// `PROFILE`이 없으면 `dev`로 간주하며, 알 수 없는 값이면 `.env`만 읽습니다.
fn load_env_file() -> (String, Result<String, String>) {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    let file = match profile.as_str() {
        "dev" | "prod" => format!(".env.{}", profile),
        _ => ".env".to_string(),
    };

    let loaded = dotenv::from_filename(&file)
        .map(|_| file.clone())
        .map_err(|e| format!("{} ({})", file, e));

    (profile, loaded)
}

/// 로깅 시스템을 초기화합니다
///
/// # Environment Variables
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=info")
///
/// ```bash
/// RUST_LOG=auth_gateway::services=debug cargo run
/// ```
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}

/// CORS 정책
///
/// `CORS_ALLOWED_ORIGINS`의 오리진만 허용하며, 쿠키 전달을 위해 자격 증명을 지원합니다.
fn configure_cors() -> Cors {
    let cors = ServerConfig::cors_allowed_origins()
        .into_iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(&origin));

    // 프록시 대상 API의 메서드 전부
    cors.allowed_methods(["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600)
}
