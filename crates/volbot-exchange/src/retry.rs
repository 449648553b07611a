//! 제한된 재시도 정책.
//!
//! 전송 계층 실패에 대해서만 지수 백오프로 재시도합니다.
//! 재시도 횟수와 대기 시간이 모두 상한을 가지므로 업스트림 장애가
//! 요청을 무한정 붙잡아 둘 수 없습니다.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{ExchangeError, ExchangeResult};

/// 재시도 설정.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// 최대 시도 횟수 (첫 시도 포함)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간 (밀리초)
    pub initial_delay_ms: u64,
    /// 백오프 배수
    pub backoff_multiplier: u32,
    /// 대기 시간 상한 (밀리초)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            backoff_multiplier: 2,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryConfig {
    /// 재시도 없이 한 번만 시도하는 설정.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

/// 주어진 작업을 재시도 정책에 따라 실행합니다.
///
/// `ExchangeError::is_retryable()`이 true인 에러만 재시도하며,
/// 비즈니스 에러는 즉시 호출자에게 반환합니다.
///
/// # 인자
/// * `config` - 재시도 설정
/// * `op_name` - 로그에 남길 작업 이름
/// * `op` - 실행할 비동기 작업
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    op_name: &str,
    mut op: F,
) -> ExchangeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ExchangeResult<T>>,
{
    let mut delay_ms = config.initial_delay_ms;
    let max_attempts = config.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(
                    op = op_name,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay_ms,
                    error = %err,
                    "요청 실패, 재시도 대기"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms * config.backoff_multiplier as u64).min(config.max_delay_ms);
            }
            Err(err) => {
                if err.is_retryable() {
                    warn!(op = op_name, attempts = max_attempts, error = %err, "재시도 소진");
                }
                return Err(err);
            }
        }
    }

    unreachable!("retry loop always returns")
}
