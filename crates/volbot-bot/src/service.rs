//! 요청 단위 분석 파사드.
//!
//! 심볼 해석 → 캔들 조회 → 통계 계산을 한 요청으로 묶습니다.
//! 요청은 전체 성공 또는 전체 실패이며, 부분 결과를 경계 밖으로
//! 내보내지 않습니다. 요청 간 공유 상태도 없습니다.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use volbot_analytics::{
    top_negative_funding, AnalyticsError, LadderPlan, LadderPlanner, VolatilityEngine,
    VolatilityReport,
};
use volbot_core::{Candle, FundingRate, Instrument, MarketCategory};
use volbot_exchange::{BybitClient, ExchangeError, SymbolResolver, MAX_KLINE_LIMIT};

use crate::error::{BotError, BotResult};

/// 기본 펀딩비 랭킹 개수.
pub const DEFAULT_FUNDING_COUNT: usize = 10;

/// 분석 요청 파사드.
pub struct ReportService {
    client: Arc<BybitClient>,
    resolver: SymbolResolver,
    engine: VolatilityEngine,
    planner: LadderPlanner,
}

impl ReportService {
    /// 새 서비스 생성.
    pub fn new(client: Arc<BybitClient>) -> Self {
        Self {
            resolver: SymbolResolver::new(Arc::clone(&client)),
            client,
            engine: VolatilityEngine::new(),
            planner: LadderPlanner::new(),
        }
    }

    /// 티커 해석 후 일봉 시계열을 조회합니다.
    async fn fetch_series(&self, raw_ticker: &str) -> BotResult<(Instrument, Vec<Candle>)> {
        let instrument = self.resolver.resolve(raw_ticker).await?;
        let candles = self
            .client
            .get_daily_klines(instrument.category, &instrument.symbol, MAX_KLINE_LIMIT)
            .await?;
        Ok((instrument, candles))
    }

    /// 티커를 해석하고 변동성 리포트를 계산합니다.
    pub async fn volatility_report(
        &self,
        raw_ticker: &str,
    ) -> BotResult<(Instrument, VolatilityReport)> {
        let (instrument, candles) = self.fetch_series(raw_ticker).await?;
        let report = self.engine.analyze(&candles)?;

        info!(
            symbol = %instrument.symbol,
            category = %instrument.category,
            candles = report.candle_count,
            "변동성 리포트 생성"
        );

        Ok((instrument, report))
    }

    /// 티커를 해석하고 6단계 DCA 래더를 계산합니다.
    ///
    /// 잘못된 투입 금액은 네트워크 호출 전에 거부됩니다.
    /// 현재가는 최근 일봉 종가를 사용합니다.
    pub async fn dca_plan(
        &self,
        raw_ticker: &str,
        cost_basis: f64,
    ) -> BotResult<(Instrument, LadderPlan)> {
        if !(cost_basis.is_finite() && cost_basis > 0.0) {
            return Err(BotError::Analytics(AnalyticsError::InvalidInput(
                "투입 금액은 양수여야 합니다 (예: /dca BTC 1000)".to_string(),
            )));
        }

        let (instrument, candles) = self.fetch_series(raw_ticker).await?;
        let report = self.engine.analyze(&candles)?;

        let current_price = candles
            .last()
            .and_then(|c| c.close.to_f64())
            .ok_or_else(|| {
                BotError::Exchange(ExchangeError::ParseError("최근 종가 없음".to_string()))
            })?;

        let plan = self
            .planner
            .plan(&report.dca_levels, cost_basis, current_price)?;

        info!(
            symbol = %instrument.symbol,
            cost_basis = cost_basis,
            current_price = current_price,
            "DCA 래더 생성"
        );

        Ok((instrument, plan))
    }

    /// linear 무기한 시장의 음수 펀딩비 상위 n개를 반환합니다.
    pub async fn negative_funding(&self, n: usize) -> BotResult<Vec<FundingRate>> {
        let rates = self
            .client
            .get_funding_rates(MarketCategory::Linear)
            .await?;
        Ok(top_negative_funding(rates, n))
    }
}
