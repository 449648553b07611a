//! 변동성 지표 일괄 계산 엔진.
//!
//! 일봉 캔들 시계열에서 다음을 계산합니다:
//! - 일간/주간 변동성 (로그 수익률 표본 표준편차, 주간 = 일간 × √7)
//! - 최대 급등/급락 (부호 있는 극단 로그 수익률)
//! - 장중 펌프/덤프 통계
//! - ATR(14), ATR(28) 및 종가 대비 비율
//! - 펌프 분포 백분위 (DCA 트리거 레벨)
//!
//! ATR은 마지막 n개 True Range의 단순 평균(SMA)입니다. Wilder 지수
//! 평활은 사용하지 않습니다. 캔들이 n개 미만이면 해당 ATR만 `None`으로
//! 보고하며 전체 분석을 실패시키지 않습니다.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use volbot_core::Candle;

use crate::error::{AnalyticsError, AnalyticsResult};

/// DCA 레벨로 사용하는 펌프 백분위.
pub const PERCENTILES: [u8; 6] = [75, 80, 85, 90, 95, 99];

/// 장중 펌프/덤프 요약 통계.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntradayStats {
    /// 평균
    pub avg: f64,
    /// 표본 표준편차 (ddof=1)
    pub std: f64,
    /// 최댓값
    pub max: f64,
    /// 최솟값
    pub min: f64,
}

impl IntradayStats {
    fn from_values(values: &[f64]) -> Self {
        Self {
            avg: mean(values),
            std: sample_std(values),
            max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            min: values.iter().cloned().fold(f64::INFINITY, f64::min),
        }
    }
}

/// 변동성 분석 결과 번들.
///
/// 요청 단위로 생성되는 불변 값입니다. 캔들 수가 부족해 계산할 수 없는
/// 지표는 `None`으로 보고됩니다 (지표 하나가 전체 분석을 막지 않음).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    /// 분석에 사용한 캔들 수
    pub candle_count: usize,
    /// 일간 변동성 (로그 수익률 표본 표준편차)
    pub daily_vol: f64,
    /// 주간 변동성 (일간 × √7)
    pub weekly_vol: f64,
    /// 최대 일간 급등 (최대 로그 수익률)
    pub max_surge: f64,
    /// 최대 일간 급락 (최소 로그 수익률, 부호 유지)
    pub max_crash: f64,
    /// 장중 펌프 (고가-시가)/시가 통계
    pub pump: IntradayStats,
    /// 장중 덤프 (시가-저가)/시가 통계
    pub dump: IntradayStats,
    /// ATR(14), 캔들 14개 미만이면 None
    pub atr_14: Option<f64>,
    /// ATR(28), 캔들 28개 미만이면 None
    pub atr_28: Option<f64>,
    /// ATR(14) / 최근 종가
    pub atr_14_pct: Option<f64>,
    /// ATR(28) / 최근 종가
    pub atr_28_pct: Option<f64>,
    /// 펌프 백분위 레벨 (P75~P99)
    pub dca_levels: BTreeMap<u8, f64>,
}

/// 변동성 계산 엔진.
///
/// 상태가 없는 순수 함수 계산기입니다. 동일한 시계열에 대해
/// 항상 비트 단위로 동일한 결과를 반환합니다.
#[derive(Debug, Default)]
pub struct VolatilityEngine;

impl VolatilityEngine {
    /// 새 엔진 생성.
    pub fn new() -> Self {
        Self
    }

    /// 캔들 시계열을 분석합니다.
    ///
    /// # Errors
    /// - `InsufficientData` - 캔들이 2개 미만 (변동성 정의 불가)
    /// - `InvalidInput` - 시가/종가가 양수가 아님
    pub fn analyze(&self, candles: &[Candle]) -> AnalyticsResult<VolatilityReport> {
        if candles.len() < 2 {
            return Err(AnalyticsError::InsufficientData {
                required: 2,
                provided: candles.len(),
            });
        }

        let opens = to_f64_series(candles, |c| c.open)?;
        let highs = to_f64_series(candles, |c| c.high)?;
        let lows = to_f64_series(candles, |c| c.low)?;
        let closes = to_f64_series(candles, |c| c.close)?;

        if opens.iter().chain(closes.iter()).any(|&v| v <= 0.0) {
            return Err(AnalyticsError::InvalidInput(
                "시가와 종가는 양수여야 합니다".to_string(),
            ));
        }

        // 로그 수익률
        let log_returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();

        let daily_vol = sample_std(&log_returns);
        let weekly_vol = daily_vol * 7f64.sqrt();

        let max_surge = log_returns.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let max_crash = log_returns.iter().cloned().fold(f64::INFINITY, f64::min);

        // 장중 펌프/덤프 (양의 크기)
        let pumps: Vec<f64> = opens
            .iter()
            .zip(&highs)
            .map(|(o, h)| (h - o) / o)
            .collect();
        let dumps: Vec<f64> = opens.iter().zip(&lows).map(|(o, l)| (o - l) / o).collect();

        // True Range: 첫날은 당일 범위만 사용
        let mut true_ranges = Vec::with_capacity(candles.len());
        true_ranges.push(highs[0] - lows[0]);
        for i in 1..candles.len() {
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            true_ranges.push(hl.max(hc).max(lc));
        }

        let last_close = closes[closes.len() - 1];
        let atr_14 = atr_sma(&true_ranges, 14);
        let atr_28 = atr_sma(&true_ranges, 28);

        let dca_levels = PERCENTILES
            .iter()
            .map(|&k| (k, percentile(&pumps, k as f64)))
            .collect();

        Ok(VolatilityReport {
            candle_count: candles.len(),
            daily_vol,
            weekly_vol,
            max_surge,
            max_crash,
            pump: IntradayStats::from_values(&pumps),
            dump: IntradayStats::from_values(&dumps),
            atr_14,
            atr_28,
            atr_14_pct: atr_14.map(|a| a / last_close),
            atr_28_pct: atr_28.map(|a| a / last_close),
            dca_levels,
        })
    }
}

/// Decimal 캔들 필드를 f64 배열로 변환.
fn to_f64_series(
    candles: &[Candle],
    field: impl Fn(&Candle) -> rust_decimal::Decimal,
) -> AnalyticsResult<Vec<f64>> {
    candles
        .iter()
        .map(|c| {
            field(c)
                .to_f64()
                .ok_or_else(|| AnalyticsError::InvalidInput("가격 변환 실패".to_string()))
        })
        .collect()
}

/// 산술 평균.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 표본 표준편차 (ddof=1).
///
/// 관측값이 2개 미만이면 분산이 정의되지 않으므로 0을 반환합니다.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// 마지막 n개 True Range의 단순 평균.
fn atr_sma(true_ranges: &[f64], period: usize) -> Option<f64> {
    if true_ranges.len() < period {
        return None;
    }
    Some(mean(&true_ranges[true_ranges.len() - period..]))
}

/// k 백분위 (순서통계량 사이 선형 보간).
///
/// rank = k/100 × (n−1)을 기준으로 이웃한 두 관측값을 보간합니다.
fn percentile(values: &[f64], k: f64) -> f64 {
    debug_assert!(!values.is_empty());

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (k / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as f64;

    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}
