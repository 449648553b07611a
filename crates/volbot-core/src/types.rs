//! 시장 카테고리, 인스트루먼트, 캔들 타입 정의.
//!
//! 이 모듈은 시장 데이터 관련 타입을 정의합니다:
//! - `MarketCategory` - Bybit 시장 카테고리 (linear, inverse, spot)
//! - `Instrument` - 카테고리가 확정된 거래 심볼
//! - `Candle` - OHLCV 일봉 데이터
//! - `FundingRate` - 무기한 선물 펀딩비

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bybit 시장 카테고리.
///
/// 심볼 해석 시 `ORDER` 순서대로 조회합니다. 무기한 선물(linear)이
/// 이 봇의 주 거래 대상이므로 항상 가장 먼저 확인합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCategory {
    /// USDT/USDC 무기한 선물
    Linear,
    /// 코인 마진 선물
    Inverse,
    /// 현물 시장
    Spot,
}

impl MarketCategory {
    /// 심볼 해석 우선순위. 변경하면 해석 결과가 달라지므로 고정.
    pub const ORDER: [MarketCategory; 3] = [
        MarketCategory::Linear,
        MarketCategory::Inverse,
        MarketCategory::Spot,
    ];

    /// Bybit API의 category 파라미터 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketCategory::Linear => "linear",
            MarketCategory::Inverse => "inverse",
            MarketCategory::Spot => "spot",
        }
    }
}

impl fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 카테고리가 확정된 거래 인스트루먼트.
///
/// 심볼은 거래소 정식 표기(대문자)이며 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// 정식 심볼 (예: "BTCUSDT")
    pub symbol: String,
    /// 소속 시장 카테고리
    pub category: MarketCategory,
}

impl Instrument {
    /// 새 인스트루먼트를 생성합니다. 심볼은 대문자로 정규화됩니다.
    pub fn new(symbol: impl Into<String>, category: MarketCategory) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            category,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.category)
    }
}

/// OHLCV 일봉 캔들.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시간
    pub ts: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량 (기준 자산 단위)
    pub volume: Decimal,
}

impl Candle {
    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// 무기한 선물 펀딩비.
///
/// 음수 펀딩비는 숏 포지션이 롱 포지션에게 지불하는 상태를 의미합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRate {
    /// 거래 심볼
    pub symbol: String,
    /// 현재 펀딩비 (음수 가능)
    pub rate: Decimal,
}
