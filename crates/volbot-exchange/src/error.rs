//! 거래소 에러 타입.

use thiserror::Error;

/// Bybit 연동 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 거래소 연결 끊김
    #[error("Disconnected: {0}")]
    Disconnected(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Bybit API 에러 응답 (retCode != 0)
    #[error("API error {code}: {message}")]
    ApiError { code: i64, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 어느 카테고리에서도 심볼을 찾을 수 없음
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// 사용자 입력 티커 형식 오류
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),
}

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

impl ExchangeError {
    /// 재시도 가능한 에러인지 확인.
    ///
    /// 전송 계층 실패만 재시도합니다. 거래소가 정상적으로 반환한
    /// 비즈니스 에러(ApiError, SymbolNotFound 등)는 재시도 대상이 아닙니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_)
                | ExchangeError::Timeout(_)
                | ExchangeError::Disconnected(_)
                | ExchangeError::RateLimited
        )
    }

    /// 사용자 입력이 원인인 에러인지 확인.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ExchangeError::SymbolNotFound(_) | ExchangeError::InvalidTicker(_)
        )
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_decode() {
            ExchangeError::ParseError(err.to_string())
        } else {
            ExchangeError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(ExchangeError::Timeout("10s".to_string()).is_retryable());
        assert!(ExchangeError::RateLimited.is_retryable());
        assert!(!ExchangeError::ApiError {
            code: 10001,
            message: "params error".to_string()
        }
        .is_retryable());
        assert!(!ExchangeError::SymbolNotFound("XYZABC".to_string()).is_retryable());
    }

    #[test]
    fn test_error_user_facing() {
        assert!(ExchangeError::InvalidTicker("!!".to_string()).is_user_error());
        assert!(!ExchangeError::NetworkError("refused".to_string()).is_user_error());
    }
}
