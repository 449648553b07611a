//! 펌프 백분위 기반 6단계 진입 래더.
//!
//! 세션 1은 현재가 시장가 진입이며, 세션 2~6은 원래 진입가 대비
//! 상승 폭(오름차순 백분위 레벨)이 트리거입니다. 하락 매수(dip-buy)가
//! 아니라 상승 방향 DCA 전략이며, 이 비대칭은 의도된 설계입니다.
//! 각 세션의 누적 코인 노출은 직전 세션의 정확히 2배가 됩니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// 래더 세션 수 (시장가 진입 1회 + 트리거 5회).
pub const LADDER_SESSIONS: usize = 6;

/// 래더의 한 세션.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderStep {
    /// 세션 번호 (1~6)
    pub session: u8,
    /// 원래 진입가 대비 트리거 상승률 (세션 1은 0)
    pub trigger_pct: f64,
    /// 트리거 가격
    pub trigger_price: f64,
    /// 이 세션까지의 누적 코인 수량
    pub cumulative_coins: f64,
    /// 이 세션까지의 누적 투입 금액
    pub cumulative_cost: f64,
    /// 누적 평균 진입가 (누적 금액 / 누적 수량)
    pub average_entry: f64,
}

/// 6단계 진입 래더 계획.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderPlan {
    /// 세션 목록 (항상 6개)
    pub steps: Vec<LadderStep>,
}

/// 래더 계산기.
#[derive(Debug, Default)]
pub struct LadderPlanner;

impl LadderPlanner {
    /// 새 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 진입 래더를 계산합니다.
    ///
    /// `dca_levels`의 오름차순 백분위 중 앞의 5개가 세션 2~6의
    /// 트리거 상승률로 사용됩니다.
    ///
    /// # Errors
    /// 투입 금액이나 현재가가 양수가 아니거나, 백분위 레벨이 5개 미만이면
    /// `InvalidInput`을 반환합니다.
    pub fn plan(
        &self,
        dca_levels: &BTreeMap<u8, f64>,
        cost_basis: f64,
        current_price: f64,
    ) -> AnalyticsResult<LadderPlan> {
        if !(cost_basis.is_finite() && cost_basis > 0.0) {
            return Err(AnalyticsError::InvalidInput(
                "투입 금액은 양수여야 합니다".to_string(),
            ));
        }
        if !(current_price.is_finite() && current_price > 0.0) {
            return Err(AnalyticsError::InvalidInput(
                "현재가는 양수여야 합니다".to_string(),
            ));
        }
        if dca_levels.len() < LADDER_SESSIONS - 1 {
            return Err(AnalyticsError::InvalidInput(format!(
                "백분위 레벨이 부족합니다: 필요 {}개, 제공 {}개",
                LADDER_SESSIONS - 1,
                dca_levels.len()
            )));
        }

        // BTreeMap은 키(백분위) 오름차순으로 순회
        let levels: Vec<f64> = dca_levels.values().take(LADDER_SESSIONS - 1).copied().collect();

        let mut steps = Vec::with_capacity(LADDER_SESSIONS);

        // 세션 1: 현재가 시장가 진입
        let mut cumulative_coins = cost_basis / current_price;
        let mut cumulative_cost = cost_basis;
        steps.push(LadderStep {
            session: 1,
            trigger_pct: 0.0,
            trigger_price: current_price,
            cumulative_coins,
            cumulative_cost,
            average_entry: current_price,
        });

        // 세션 2~6: 누적 수량 2배씩, 추가 수량은 트리거 가격에 매수
        for (i, &pct) in levels.iter().enumerate() {
            let trigger_price = current_price * (1.0 + pct);
            let added_coins = cumulative_coins; // 2배 = 기존 수량만큼 추가
            cumulative_coins *= 2.0;
            cumulative_cost += added_coins * trigger_price;

            steps.push(LadderStep {
                session: (i + 2) as u8,
                trigger_pct: pct,
                trigger_price,
                cumulative_coins,
                cumulative_cost,
                average_entry: cumulative_cost / cumulative_coins,
            });
        }

        Ok(LadderPlan { steps })
    }
}
