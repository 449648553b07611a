//! 변동성 통계 및 DCA 래더 계산.
//!
//! 이 크레이트는 캔들 시계열을 입력으로 받는 순수 함수 계산만 포함합니다:
//! - `VolatilityEngine` - 변동성/리스크 지표 일괄 계산
//! - `LadderPlanner` - 펌프 백분위 기반 6단계 진입 래더
//! - 펀딩비 정렬
//!
//! 네트워크 I/O나 공유 상태는 없으며, 동일 입력은 항상 동일 출력을 냅니다.

pub mod error;
pub mod funding;
pub mod ladder;
pub mod volatility;

pub use error::{AnalyticsError, AnalyticsResult};
pub use funding::top_negative_funding;
pub use ladder::{LadderPlan, LadderPlanner, LadderStep, LADDER_SESSIONS};
pub use volatility::{IntradayStats, VolatilityEngine, VolatilityReport, PERCENTILES};
