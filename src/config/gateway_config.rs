//! 게이트웨이 라우팅, Rate Limiting, 저장소 정리 설정
//!
//! ```bash
//! export GATEWAY_UPSTREAMS="/api=http://java-service:8080,/other-api=http://python-service:8000"
//! export UPSTREAM_TIMEOUT_SECS="30"
//! export RATE_LIMIT_PER_MINUTE="60"
//! export RATE_LIMIT_WINDOW_SECS="60"
//! export STORE_SWEEP_INTERVAL_SECS="300"
//! ```

use std::collections::HashSet;
use std::env;
use std::time::Duration;
use reqwest::Url;
use crate::config::auth_config::{bounded_var, positive_var};
use crate::errors::{AppError, AppResult, ErrorContext};

const DEFAULT_UPSTREAMS: &str = "/api=http://java-service:8080,/other-api=http://python-service:8000";

/// 경로 접두사 하나와 그에 고정된 백엔드 오리진
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRoute {
    /// `/api` 형태의 경로 접두사 (끝에 `/` 없음)
    pub prefix: String,
    /// `http://java-service:8080` 형태의 오리진 (끝에 `/` 없음)
    pub origin: String,
}

/// 정적 접두사 → 오리진 라우팅 테이블 설정
pub struct UpstreamConfig;

impl UpstreamConfig {
    /// `GATEWAY_UPSTREAMS`에서 라우팅 테이블을 읽습니다.
    ///
    /// # Errors
    ///
    /// 테이블 형식이 잘못된 경우 `ConfigError`
    pub fn routes() -> AppResult<Vec<UpstreamRoute>> {
        let raw = env::var("GATEWAY_UPSTREAMS").unwrap_or_else(|_| DEFAULT_UPSTREAMS.to_string());
        Self::parse_routes(&raw)
    }

    /// `<prefix>=<origin>` 항목을 쉼표로 이은 문자열을 파싱합니다.
    ///
    /// # 규칙
    ///
    /// - 접두사는 `/`로 시작하고, `/` 자체가 아니며, `/`로 끝나지 않습니다.
    /// - 오리진은 `http`/`https` 절대 URL 입니다.
    /// - 같은 접두사를 두 번 등록할 수 없습니다.
    pub fn parse_routes(raw: &str) -> AppResult<Vec<UpstreamRoute>> {
        let mut seen = HashSet::new();
        let mut routes = Vec::new();

        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (prefix, origin) = entry.split_once('=').ok_or_else(|| {
                AppError::ConfigError(format!("Upstream entry '{}' must be <prefix>=<origin>", entry))
            })?;
            let prefix = prefix.trim();
            let origin = origin.trim().trim_end_matches('/');

            if !prefix.starts_with('/') || prefix == "/" || prefix.ends_with('/') {
                return Err(AppError::ConfigError(format!(
                    "Upstream prefix '{}' must start with '/' and not end with '/'",
                    prefix
                )));
            }

            let url = Url::parse(origin).map_err(|e| {
                AppError::ConfigError(format!("Upstream origin '{}' is not a URL: {}", origin, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(AppError::ConfigError(format!(
                    "Upstream origin '{}' must be an absolute http(s) URL",
                    origin
                )));
            }

            if !seen.insert(prefix.to_string()) {
                return Err(AppError::ConfigError(format!(
                    "Upstream prefix '{}' is configured twice",
                    prefix
                )));
            }

            routes.push(UpstreamRoute {
                prefix: prefix.to_string(),
                origin: origin.to_string(),
            });
        }

        if routes.is_empty() {
            return Err(AppError::ConfigError("No upstream routes configured".to_string()));
        }

        Ok(routes)
    }

    /// 백엔드/Identity Provider 요청 타임아웃 (기본값: 30초)
    pub fn timeout() -> Duration {
        Duration::from_secs(positive_var("UPSTREAM_TIMEOUT_SECS", 30) as u64)
    }
}

/// 윈도우당 허용 요청 수 상한
pub const MAX_REQUESTS_PER_WINDOW: i64 = 1_000_000;

/// 고정 윈도우 Rate Limiting 설정
pub struct RateLimitConfig;

impl RateLimitConfig {
    /// 윈도우당 허용 요청 수 (기본값: 60)
    ///
    /// # Errors
    ///
    /// [`MAX_REQUESTS_PER_WINDOW`]를 넘으면 `ConfigError`
    pub fn requests_per_window() -> AppResult<u32> {
        let limit = bounded_var("RATE_LIMIT_PER_MINUTE", 60, MAX_REQUESTS_PER_WINDOW)?;
        u32::try_from(limit).config_context("RATE_LIMIT_PER_MINUTE out of range")
    }

    /// 윈도우 길이 (기본값: 60초)
    pub fn window() -> Duration {
        Duration::from_secs(positive_var("RATE_LIMIT_WINDOW_SECS", 60) as u64)
    }
}

const DEFAULT_SWEEP_SECS: u64 = 300;

/// 메모리 저장소 백그라운드 정리 설정
pub struct MaintenanceConfig;

impl MaintenanceConfig {
    /// 정리 주기. `0`이면 정리 작업을 띄우지 않습니다 (기본값: 300초).
    pub fn sweep_interval() -> Option<Duration> {
        parse_sweep_interval(env::var("STORE_SWEEP_INTERVAL_SECS").ok().as_deref())
    }
}

fn parse_sweep_interval(raw: Option<&str>) -> Option<Duration> {
    let secs = match raw.map(|v| (v, v.trim().parse::<u64>())) {
        None => DEFAULT_SWEEP_SECS,
        Some((_, Ok(secs))) => secs,
        Some((v, Err(_))) => {
            log::error!(
                "STORE_SWEEP_INTERVAL_SECS 파싱 실패: '{}'. 기본값 {} 사용",
                v, DEFAULT_SWEEP_SECS
            );
            DEFAULT_SWEEP_SECS
        }
    };

    (secs > 0).then(|| Duration::from_secs(secs))
}
