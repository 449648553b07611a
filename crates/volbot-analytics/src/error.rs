//! 분석 에러 타입.

use thiserror::Error;

/// 통계 계산 오류.
#[derive(Debug, Error, PartialEq)]
pub enum AnalyticsError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 분석 계산 결과 타입.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
