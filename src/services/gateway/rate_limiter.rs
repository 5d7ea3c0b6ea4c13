//! 고정 윈도우 Rate Limiter
//!
//! 클라이언트 식별자별로 `{count, reset_at}` 윈도우를 유지합니다.
//!
//! 1. 윈도우 없음 → `{count: 1, reset_at: now + window}` 생성 후 허용
//! 2. `now >= reset_at` → 윈도우 재시작 후 허용
//! 3. `count < limit` → 증가 후 허용
//! 4. 그 외 → 거부 (카운트는 변경하지 않음)
//!
//! 윈도우 경계에서 최대 2배까지 몰릴 수 있는 단순한 방식입니다.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use parking_lot::Mutex;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    count: u32,
    reset_at: Instant,
}

/// 클라이언트별 고정 윈도우 카운터
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, ClientWindow>>,
}

impl RateLimiter {
    /// `window` 동안 `limit`개의 요청을 허용하는 limiter를 만듭니다.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// 현재 시각 기준으로 요청 허용 여부를 판단합니다.
    ///
    /// # Errors
    ///
    /// 한도를 넘으면 남은 윈도우 시간(초)을 담은 `AppError::RateLimitExceeded`
    pub fn admit(&self, identity: &str) -> AppResult<()> {
        self.admit_at(identity, Instant::now())
    }

    /// 주어진 시각 기준으로 요청 허용 여부를 판단합니다.
    pub fn admit_at(&self, identity: &str, now: Instant) -> AppResult<()> {
        let mut windows = self.windows.lock();

        match windows.get_mut(identity) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.limit {
                    let remaining = window.reset_at.saturating_duration_since(now);
                    return Err(AppError::RateLimitExceeded {
                        retry_after_secs: retry_after_secs(remaining),
                    });
                }
                window.count += 1;
            }
            Some(window) => {
                window.count = 1;
                window.reset_at = now + self.window;
            }
            None => {
                windows.insert(
                    identity.to_string(),
                    ClientWindow {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
            }
        }

        Ok(())
    }

    /// 이미 끝난 윈도우를 제거하고 제거된 개수를 반환합니다.
    pub fn purge_stale(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, window| now < window.reset_at);
        before - windows.len()
    }

    /// 추적 중인 클라이언트 수
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().len()
    }
}

/// 남은 시간을 초 단위로 올림합니다. 최소 1초.
fn retry_after_secs(remaining: Duration) -> u64 {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    secs.max(1)
}
