//! 변동성 엔진 및 래더 속성 테스트 (proptest 기반).

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use volbot_analytics::{LadderPlanner, VolatilityEngine, LADDER_SESSIONS};
use volbot_core::Candle;

/// 종가 목록에서 합성 캔들 시계열 생성.
fn candles_from_closes(closes: &[u32]) -> Vec<Candle> {
    let mut prev = closes[0];
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { prev };
            prev = close;
            let high = open.max(close) + 1;
            let low = open.min(close).saturating_sub(1).max(1);
            Candle {
                ts: Utc
                    .timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0)
                    .unwrap(),
                open: Decimal::from(open),
                high: Decimal::from(high),
                low: Decimal::from(low),
                close: Decimal::from(close),
                volume: Decimal::from(100),
            }
        })
        .collect()
}

proptest! {
    /// 캔들 2개 이상이면 항상 분석 가능하며 주간 변동성 = 일간 × √7.
    #[test]
    fn weekly_vol_scales_daily(closes in prop::collection::vec(50u32..5000, 2..80)) {
        let candles = candles_from_closes(&closes);
        let report = VolatilityEngine::new().analyze(&candles).unwrap();

        prop_assert!(report.daily_vol >= 0.0);
        prop_assert!((report.weekly_vol - report.daily_vol * 7f64.sqrt()).abs() < 1e-12);
        prop_assert_eq!(report.candle_count, closes.len());
    }

    /// 백분위 레벨은 k에 대해 비감소.
    #[test]
    fn percentile_levels_non_decreasing(closes in prop::collection::vec(50u32..5000, 2..80)) {
        let candles = candles_from_closes(&closes);
        let report = VolatilityEngine::new().analyze(&candles).unwrap();

        let levels: Vec<f64> = report.dca_levels.values().cloned().collect();
        prop_assert!(levels.windows(2).all(|w| w[0] <= w[1] + 1e-15));
    }

    /// ATR은 캔들 수가 충분할 때만 존재하고 항상 0 이상.
    #[test]
    fn atr_availability_follows_length(closes in prop::collection::vec(50u32..5000, 2..80)) {
        let candles = candles_from_closes(&closes);
        let report = VolatilityEngine::new().analyze(&candles).unwrap();

        prop_assert_eq!(report.atr_14.is_some(), closes.len() >= 14);
        prop_assert_eq!(report.atr_28.is_some(), closes.len() >= 28);
        if let Some(atr) = report.atr_14 {
            prop_assert!(atr >= 0.0);
        }
    }

    /// 래더 누적 노출은 세션마다 정확히 2배.
    #[test]
    fn ladder_exposure_doubles(
        cost_basis in 1.0f64..1_000_000.0,
        price in 0.001f64..100_000.0,
        base_level in 0.001f64..0.2,
    ) {
        let levels: BTreeMap<u8, f64> = [75u8, 80, 85, 90, 95]
            .iter()
            .enumerate()
            .map(|(i, &k)| (k, base_level * (i + 1) as f64))
            .collect();

        let plan = LadderPlanner::new().plan(&levels, cost_basis, price).unwrap();
        prop_assert_eq!(plan.steps.len(), LADDER_SESSIONS);

        for w in plan.steps.windows(2) {
            let ratio = w[1].cumulative_coins / w[0].cumulative_coins;
            prop_assert!((ratio - 2.0).abs() < 1e-9);
            prop_assert!(w[1].cumulative_cost > w[0].cumulative_cost);
        }
    }
}
