//! Bybit v5 시장 데이터 커넥터.
//!
//! 공개(read-only) REST 엔드포인트만 사용합니다:
//! - `/v5/market/instruments-info` - 인스트루먼트 목록
//! - `/v5/market/kline` - 일봉 캔들
//! - `/v5/market/tickers` - 펀딩비가 포함된 시세

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use volbot_core::{Candle, FundingRate, Instrument, MarketCategory};

use crate::error::{ExchangeError, ExchangeResult};
use crate::retry::{with_retry, RetryConfig};

/// 한 번에 요청 가능한 최대 캔들 수 (Bybit 제한).
pub const MAX_KLINE_LIMIT: u32 = 1000;

// ============================================================================
// 설정
// ============================================================================

/// Bybit 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct BybitConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 재시도 정책
    pub retry: RetryConfig,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bybit.com".to_string(),
            timeout_secs: 10,
            retry: RetryConfig::default(),
        }
    }
}

impl BybitConfig {
    /// 테스트용 기본 URL 재정의.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 환경 변수에서 생성.
    ///
    /// `BYBIT_BASE_URL`, `BYBIT_TIMEOUT_SECS`가 설정되지 않으면 기본값을 사용합니다.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("BYBIT_BASE_URL") {
            config.base_url = url;
        }
        if let Some(secs) = std::env::var("BYBIT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

/// Bybit v5 공통 응답 봉투.
///
/// 에러 응답의 `result`는 null이 아니라 빈 객체 `{}`로 올 수 있으므로
/// `retCode` 확인 전에는 타입을 확정하지 않고 JSON 값으로 둡니다.
#[derive(Debug, Deserialize)]
struct BybitResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct InstrumentsResult {
    list: Vec<InstrumentInfo>,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct KlineResult {
    list: Vec<KlineRow>,
}

/// kline 행: [startTime, open, high, low, close, volume, turnover].
#[derive(Debug, Deserialize)]
struct KlineRow(
    String, // 0: start time (ms)
    String, // 1: open
    String, // 2: high
    String, // 3: low
    String, // 4: close
    String, // 5: volume
    String, // 6: turnover
);

#[derive(Debug, Deserialize)]
struct TickersResult {
    list: Vec<TickerInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerInfo {
    symbol: String,
    #[serde(default)]
    funding_rate: Option<String>,
}

// ============================================================================
// Bybit 클라이언트
// ============================================================================

/// Bybit 시장 데이터 클라이언트.
///
/// 모든 호출에 타임아웃과 제한된 재시도가 적용됩니다. 거래소가 정상적으로
/// 반환한 비즈니스 에러는 재시도하지 않고 즉시 반환합니다.
pub struct BybitClient {
    config: BybitConfig,
    client: Client,
}

impl BybitClient {
    /// 새 Bybit 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: BybitConfig) -> ExchangeResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// 환경 변수 설정으로 생성.
    pub fn from_env() -> ExchangeResult<Self> {
        Self::new(BybitConfig::from_env())
    }

    /// 파라미터에서 쿼리 문자열 생성.
    fn build_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 재시도 정책이 적용된 공개 GET 요청.
    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let query = Self::build_query(params);
        let full_url = if query.is_empty() {
            format!("{}{}", self.config.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.config.base_url, endpoint, query)
        };

        with_retry(&self.config.retry, endpoint, || self.send(&full_url)).await
    }

    /// 단일 요청 시도 및 응답 봉투 처리.
    async fn send<T: DeserializeOwned>(&self, full_url: &str) -> ExchangeResult<T> {
        debug!("GET {}", full_url);

        let response = self.client.get(full_url).send().await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                429 => ExchangeError::RateLimited,
                500..=599 => ExchangeError::Disconnected(format!("HTTP {}", status)),
                code => ExchangeError::ApiError {
                    code: code as i64,
                    message: body,
                },
            });
        }

        // retCode 확인이 result 디코딩보다 먼저여야 함. 에러 응답의
        // result는 빈 객체라 기대 타입으로 역직렬화되지 않음.
        let envelope: BybitResponse = serde_json::from_str(&body)?;
        if envelope.ret_code != 0 {
            return Err(Self::map_ret_code(envelope.ret_code, &envelope.ret_msg));
        }

        let result = envelope
            .result
            .ok_or_else(|| ExchangeError::ParseError("응답에 result 필드가 없음".to_string()))?;
        Ok(serde_json::from_value(result)?)
    }

    /// Bybit retCode를 ExchangeError로 매핑.
    fn map_ret_code(code: i64, msg: &str) -> ExchangeError {
        match code {
            10006 | 10018 => ExchangeError::RateLimited,
            10016 => ExchangeError::Disconnected(msg.to_string()),
            _ => ExchangeError::ApiError {
                code,
                message: msg.to_string(),
            },
        }
    }

    /// 카테고리의 인스트루먼트 목록 조회.
    ///
    /// `symbol`을 지정하면 해당 심볼만 조회합니다 (존재 여부 확인용).
    pub async fn get_instruments(
        &self,
        category: MarketCategory,
        symbol: Option<&str>,
    ) -> ExchangeResult<Vec<Instrument>> {
        let mut params = vec![("category", category.as_str().to_string())];
        if let Some(s) = symbol {
            params.push(("symbol", s.to_string()));
        } else {
            params.push(("limit", "1000".to_string()));
        }

        let result: InstrumentsResult = self
            .public_get("/v5/market/instruments-info", &params)
            .await?;

        Ok(result
            .list
            .into_iter()
            .map(|info| Instrument::new(info.symbol, category))
            .collect())
    }

    /// 일봉 캔들 조회.
    ///
    /// Bybit은 최신 캔들부터 반환하므로 시간 오름차순으로 정렬해 돌려줍니다.
    /// 해석된 심볼에 캔들이 전혀 없으면 `SymbolNotFound`를 반환합니다.
    pub async fn get_daily_klines(
        &self,
        category: MarketCategory,
        symbol: &str,
        limit: u32,
    ) -> ExchangeResult<Vec<Candle>> {
        let params = vec![
            ("category", category.as_str().to_string()),
            ("symbol", symbol.to_string()),
            ("interval", "D".to_string()),
            ("limit", limit.min(MAX_KLINE_LIMIT).to_string()),
        ];

        let result: KlineResult = self.public_get("/v5/market/kline", &params).await?;

        if result.list.is_empty() {
            return Err(ExchangeError::SymbolNotFound(symbol.to_string()));
        }

        let mut candles = result
            .list
            .into_iter()
            .map(Self::parse_kline_row)
            .collect::<ExchangeResult<Vec<Candle>>>()?;

        candles.sort_by_key(|c| c.ts);
        candles.dedup_by_key(|c| c.ts);

        Ok(candles)
    }

    /// kline 행을 캔들로 변환.
    fn parse_kline_row(row: KlineRow) -> ExchangeResult<Candle> {
        let ts_ms: i64 = row
            .0
            .parse()
            .map_err(|_| ExchangeError::ParseError(format!("잘못된 타임스탬프: {}", row.0)))?;
        let ts = DateTime::<Utc>::from_timestamp_millis(ts_ms)
            .ok_or_else(|| ExchangeError::ParseError(format!("범위 밖 타임스탬프: {}", ts_ms)))?;

        let parse = |field: &str, value: &str| -> ExchangeResult<Decimal> {
            value
                .parse()
                .map_err(|_| ExchangeError::ParseError(format!("잘못된 {}: {}", field, value)))
        };

        Ok(Candle {
            ts,
            open: parse("open", &row.1)?,
            high: parse("high", &row.2)?,
            low: parse("low", &row.3)?,
            close: parse("close", &row.4)?,
            volume: parse("volume", &row.5)?,
        })
    }

    /// 카테고리 전체의 현재 펀딩비 조회.
    ///
    /// 펀딩비 필드가 없거나 비어 있는 심볼은 건너뜁니다.
    pub async fn get_funding_rates(
        &self,
        category: MarketCategory,
    ) -> ExchangeResult<Vec<FundingRate>> {
        let params = vec![("category", category.as_str().to_string())];
        let result: TickersResult = self.public_get("/v5/market/tickers", &params).await?;

        Ok(result
            .list
            .into_iter()
            .filter_map(|t| {
                let raw = t.funding_rate?;
                let rate: Decimal = raw.parse().ok()?;
                Some(FundingRate {
                    symbol: t.symbol,
                    rate,
                })
            })
            .collect())
    }
}
