//! 봇 에러 타입 및 사용자 메시지 매핑.

use thiserror::Error;

use volbot_analytics::AnalyticsError;
use volbot_exchange::ExchangeError;

/// 봇 계층 에러.
#[derive(Debug, Error)]
pub enum BotError {
    /// 거래소 연동 에러
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// 통계 계산 에러
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// 텔레그램 API 에러
    #[error("Telegram error: {0}")]
    Telegram(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 봇 작업을 위한 Result 타입.
pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    /// 사용자에게 보여줄 메시지를 반환합니다.
    ///
    /// 전송 계층 세부 사항은 노출하지 않습니다. "심볼 없음"과
    /// "일시적 장애"는 반드시 구분해서 안내합니다.
    pub fn user_message(&self) -> String {
        match self {
            BotError::Exchange(ExchangeError::SymbolNotFound(symbol)) => format!(
                "'{}' 심볼을 Bybit 어느 시장(linear, inverse, spot)에서도 찾을 수 없습니다.",
                symbol
            ),
            BotError::Exchange(ExchangeError::InvalidTicker(msg)) => msg.clone(),
            BotError::Exchange(err) if err.is_retryable() => {
                "일시적으로 시장 데이터를 가져올 수 없습니다. 잠시 후 다시 시도해주세요."
                    .to_string()
            }
            BotError::Exchange(_) => {
                "거래소 응답을 처리하지 못했습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            BotError::Analytics(err) => err.to_string(),
            BotError::Telegram(_) | BotError::Config(_) => {
                "내부 오류가 발생했습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_not_found_names_symbol() {
        let err = BotError::from(ExchangeError::SymbolNotFound("XYZABC".to_string()));
        assert!(err.user_message().contains("XYZABC"));
    }

    #[test]
    fn test_transport_error_is_generic() {
        let err = BotError::from(ExchangeError::Timeout("10s".to_string()));
        let msg = err.user_message();
        assert!(msg.contains("일시적"));
        assert!(!msg.contains("10s"), "전송 세부 정보가 노출되면 안 됨");
    }

    #[test]
    fn test_insufficient_data_passes_through() {
        let err = BotError::from(AnalyticsError::InsufficientData {
            required: 2,
            provided: 1,
        });
        assert!(err.user_message().contains("부족"));
    }
}
