//! 카테고리 우선순위 기반 심볼 해석기.
//!
//! 사용자가 입력한 티커를 Bybit 정식 심볼로 변환합니다.
//! 카테고리는 반드시 linear → inverse → spot 순서로 조회합니다.
//! 무기한 선물이 이 봇의 주 거래 대상이라는 정책이며, 같은 심볼이
//! 여러 카테고리에 상장돼 있으면 항상 linear가 선택됩니다.

use std::sync::Arc;

use tracing::{debug, info};

use volbot_core::{Instrument, MarketCategory};

use crate::bybit::BybitClient;
use crate::error::{ExchangeError, ExchangeResult};

/// 티커 최대 길이. 이보다 길면 정상 심볼이 아니라고 판단합니다.
const MAX_TICKER_LEN: usize = 20;

/// 호가 통화 접미사. 사용자가 이미 붙여서 보낸 경우 후보 확장을 생략합니다.
const QUOTE_SUFFIXES: [&str; 3] = ["USDT", "USDC", "USD"];

/// 사용자 입력 티커를 정규화합니다.
///
/// 공백 제거, 대문자 변환, 영숫자 이외 문자 제거를 수행합니다.
///
/// # Errors
/// 정규화 결과가 비어 있거나 너무 길면 `InvalidTicker`를 반환합니다.
pub fn normalize_ticker(raw: &str) -> ExchangeResult<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase();

    if cleaned.is_empty() {
        return Err(ExchangeError::InvalidTicker(
            "티커가 비어 있습니다 (예: BTC, ETHUSDT)".to_string(),
        ));
    }
    if cleaned.len() > MAX_TICKER_LEN {
        return Err(ExchangeError::InvalidTicker(
            "티커가 너무 깁니다 (예: BTC, SOLUSDT)".to_string(),
        ));
    }

    Ok(cleaned)
}

/// 정규화된 티커에서 조회 후보 목록을 생성합니다.
///
/// 호가 통화 접미사가 없으면 USDT, USD를 붙인 형태를 먼저 시도합니다.
fn expand_candidates(normalized: &str) -> Vec<String> {
    if QUOTE_SUFFIXES.iter().any(|s| normalized.ends_with(s)) {
        vec![normalized.to_string()]
    } else {
        vec![
            format!("{}USDT", normalized),
            format!("{}USD", normalized),
            normalized.to_string(),
        ]
    }
}

/// 심볼 해석기.
///
/// 각 해석 요청은 거래소에서 인스트루먼트 목록을 새로 조회하며,
/// 요청 수명 이상의 캐시는 유지하지 않습니다.
pub struct SymbolResolver {
    client: Arc<BybitClient>,
}

impl SymbolResolver {
    /// 새 해석기 생성.
    pub fn new(client: Arc<BybitClient>) -> Self {
        Self { client }
    }

    /// 티커를 카테고리가 확정된 인스트루먼트로 해석합니다.
    ///
    /// 정확한 심볼 일치만 허용하며 부분/유사 매칭은 하지 않습니다.
    ///
    /// # Errors
    /// - `InvalidTicker` - 입력 형식 오류 (네트워크 호출 전에 거부)
    /// - `SymbolNotFound` - 세 카테고리 모두에서 찾지 못함
    pub async fn resolve(&self, raw: &str) -> ExchangeResult<Instrument> {
        let normalized = normalize_ticker(raw)?;
        let candidates = expand_candidates(&normalized);

        for category in MarketCategory::ORDER {
            for candidate in &candidates {
                debug!(category = %category, symbol = %candidate, "심볼 조회");

                let instruments = self
                    .client
                    .get_instruments(category, Some(candidate))
                    .await?;

                if let Some(instrument) = instruments.into_iter().next() {
                    info!(
                        ticker = %normalized,
                        symbol = %instrument.symbol,
                        category = %category,
                        "심볼 해석 완료"
                    );
                    return Ok(instrument);
                }
            }
        }

        Err(ExchangeError::SymbolNotFound(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" btc ").unwrap(), "BTC");
        assert_eq!(normalize_ticker("eth-usdt").unwrap(), "ETHUSDT");
        assert_eq!(normalize_ticker("PEPE").unwrap(), "PEPE");
    }

    #[test]
    fn test_normalize_ticker_rejects_empty() {
        assert!(matches!(
            normalize_ticker("  !!  "),
            Err(ExchangeError::InvalidTicker(_))
        ));
    }

    #[test]
    fn test_normalize_ticker_rejects_too_long() {
        assert!(matches!(
            normalize_ticker("ABCDEFGHIJKLMNOPQRSTU"),
            Err(ExchangeError::InvalidTicker(_))
        ));
    }

    #[test]
    fn test_expand_candidates_bare_ticker() {
        assert_eq!(expand_candidates("BTC"), vec!["BTCUSDT", "BTCUSD", "BTC"]);
    }

    #[test]
    fn test_expand_candidates_with_quote_suffix() {
        assert_eq!(expand_candidates("ETHUSDT"), vec!["ETHUSDT"]);
        assert_eq!(expand_candidates("BTCUSD"), vec!["BTCUSD"]);
        assert_eq!(expand_candidates("SOLUSDC"), vec!["SOLUSDC"]);
    }
}
